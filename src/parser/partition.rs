//! Page partitioning across work units

use std::ops::Range;

/// Split `[0, num_pages)` into contiguous, non-overlapping ranges
///
/// At most `max_units` ranges are produced and never more than there are
/// pages. Sizes differ by at most one; leading ranges take the extra pages.
/// `max_units` must be at least 1 (validated by `ParseConfig`).
pub fn partition_pages(num_pages: usize, max_units: usize) -> Vec<Range<usize>> {
    let units = max_units.min(num_pages);
    if units == 0 {
        return Vec::new();
    }

    let chunk = num_pages / units;
    let remainder = num_pages % units;

    let mut ranges = Vec::with_capacity(units);
    let mut start = 0;
    for i in 0..units {
        let end = start + chunk + usize::from(i < remainder);
        ranges.push(start..end);
        start = end;
    }

    debug_assert_eq!(start, num_pages);
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_and_uneven_splits() {
        assert_eq!(partition_pages(10, 4), vec![0..3, 3..6, 6..8, 8..10]);
        assert_eq!(partition_pages(5, 3), vec![0..2, 2..4, 4..5]);
        assert_eq!(partition_pages(8, 2), vec![0..4, 4..8]);
    }

    #[test]
    fn test_more_units_than_pages() {
        assert_eq!(partition_pages(5, 10), vec![0..1, 1..2, 2..3, 3..4, 4..5]);
        assert_eq!(partition_pages(1, 2), vec![0..1]);
    }

    #[test]
    fn test_no_pages() {
        assert!(partition_pages(0, 2).is_empty());
    }

    #[test]
    fn test_ranges_cover_every_page_once() {
        for num_pages in 0..40 {
            for max_units in 1..12 {
                let ranges = partition_pages(num_pages, max_units);
                assert_eq!(ranges.len(), max_units.min(num_pages));

                let mut next = 0;
                for range in &ranges {
                    assert_eq!(range.start, next, "ranges must be contiguous");
                    assert!(range.end > range.start, "ranges must be non-empty");
                    next = range.end;
                }
                assert_eq!(next, num_pages);

                let sizes: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
                if let (Some(max), Some(min)) = (sizes.iter().max(), sizes.iter().min()) {
                    assert!(max - min <= 1);
                }
            }
        }
    }
}
