//! Table region detection and merging
//!
//! Detection works on text geometry alone: spans are grouped into rows, and
//! runs of consecutive multi-cell rows whose cells line up in columns become
//! candidate regions. Candidates are then merged by edge distance.

use crate::document::{Rect, TextSpan};

/// Fewest aligned rows that make a table
pub const MIN_TABLE_ROWS: usize = 2;
/// Fewest cells a row needs to take part in a table
pub const MIN_TABLE_COLUMNS: usize = 2;

/// Cell separator used when serializing table content
pub const CELL_SEPARATOR: &str = " | ";

/// Spans sharing a vertical band, ordered left to right
#[derive(Debug, Clone)]
pub struct Row<'a> {
    pub bbox: Rect,
    pub cells: Vec<&'a TextSpan>,
}

fn shares_row(row: &Rect, span: &Rect) -> bool {
    let overlap = row.vertical_overlap(span);
    overlap > 0.0 && overlap >= 0.5 * span.height().min(row.height())
}

/// Group spans into rows, top to bottom
pub fn group_rows<'a>(spans: impl IntoIterator<Item = &'a TextSpan>) -> Vec<Row<'a>> {
    let mut spans: Vec<&TextSpan> = spans
        .into_iter()
        .filter(|s| !s.text.trim().is_empty())
        .collect();
    spans.sort_by(|a, b| {
        a.bbox
            .y0
            .total_cmp(&b.bbox.y0)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut rows: Vec<Row<'a>> = Vec::new();
    for span in spans {
        let joins = rows
            .last()
            .is_some_and(|row| shares_row(&row.bbox, &span.bbox));
        if joins {
            if let Some(row) = rows.last_mut() {
                row.bbox = row.bbox.union(&span.bbox);
                row.cells.push(span);
            }
        } else {
            rows.push(Row {
                bbox: span.bbox,
                cells: vec![span],
            });
        }
    }

    for row in &mut rows {
        row.cells.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    }
    rows
}

/// Horizontal extent of a column
type Column = (f32, f32);

fn overlaps(column: &Column, cell: &Rect) -> bool {
    cell.x0.max(column.0) < cell.x1.min(column.1)
}

/// Match a row's cells against known columns
///
/// Returns the widened column set when the row continues the table.
fn align_row(columns: &[Column], row: &Row<'_>) -> Option<Vec<Column>> {
    if row.cells.len() < MIN_TABLE_COLUMNS {
        return None;
    }

    let mut widened = columns.to_vec();
    let mut used = vec![false; columns.len()];
    let mut aligned = 0;
    let mut new_columns = Vec::new();

    for cell in &row.cells {
        let hits: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, col)| overlaps(col, &cell.bbox))
            .map(|(idx, _)| idx)
            .collect();

        match hits.as_slice() {
            [] => new_columns.push((cell.bbox.x0, cell.bbox.x1)),
            [idx] if !used[*idx] => {
                used[*idx] = true;
                aligned += 1;
                let col = &mut widened[*idx];
                *col = (col.0.min(cell.bbox.x0), col.1.max(cell.bbox.x1));
            }
            // Spans several columns, or shares a column with a sibling cell
            _ => return None,
        }
    }

    if aligned < MIN_TABLE_COLUMNS || aligned * 2 < row.cells.len() {
        return None;
    }

    widened.extend(new_columns);
    Some(widened)
}

/// Candidate table regions among the rows of one page
pub fn detect_table_regions(rows: &[Row<'_>]) -> Vec<Rect> {
    let mut regions = Vec::new();
    let mut start = 0;

    while start < rows.len() {
        if rows[start].cells.len() < MIN_TABLE_COLUMNS {
            start += 1;
            continue;
        }

        let mut columns: Vec<Column> = rows[start]
            .cells
            .iter()
            .map(|c| (c.bbox.x0, c.bbox.x1))
            .collect();
        let mut bbox = rows[start].bbox;
        let mut end = start;

        while let Some(next) = rows.get(end + 1) {
            let prev = &rows[end];
            // A gap taller than the rows themselves ends the table
            let gap = next.bbox.y0 - prev.bbox.y1;
            if gap > prev.bbox.height().max(next.bbox.height()) {
                break;
            }
            match align_row(&columns, next) {
                Some(widened) => {
                    columns = widened;
                    bbox = bbox.union(&next.bbox);
                    end += 1;
                }
                None => break,
            }
        }

        if end - start + 1 >= MIN_TABLE_ROWS {
            regions.push(bbox);
            start = end + 1;
        } else {
            start += 1;
        }
    }

    regions
}

/// Whether two boxes are within `tolerance` of each other on both axes
pub fn should_merge(a: &Rect, b: &Rect, tolerance: f32) -> bool {
    a.gap_x(b) <= tolerance && a.gap_y(b) <= tolerance
}

/// Merge boxes pairwise until no two boxes are within `tolerance`
///
/// Merging is transitive, and the output is a fixed point: feeding it back
/// in with the same tolerance returns it unchanged. Output is ordered top to
/// bottom, then left to right.
pub fn merge_regions(boxes: &[Rect], tolerance: f32) -> Vec<Rect> {
    let mut merged: Vec<Rect> = boxes.to_vec();

    loop {
        let mut changed = false;
        let mut i = 0;
        while i < merged.len() {
            let mut j = i + 1;
            while j < merged.len() {
                if should_merge(&merged[i], &merged[j], tolerance) {
                    let other = merged.remove(j);
                    merged[i] = merged[i].union(&other);
                    changed = true;
                    // The grown box may now reach boxes it skipped
                    j = i + 1;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !changed {
            break;
        }
    }

    merged.sort_by(|a, b| a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0)));
    merged
}

/// Serialize rows as `cell | cell` lines
pub fn serialize_rows(rows: &[Row<'_>]) -> String {
    rows.iter()
        .map(|row| {
            row.cells
                .iter()
                .map(|c| c.text.trim())
                .collect::<Vec<_>>()
                .join(CELL_SEPARATOR)
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
