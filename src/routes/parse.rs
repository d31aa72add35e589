//! PDF parse endpoint
//!
//! `POST /v1/pdf/parse` takes a multipart upload with the document in a
//! `file` (or `pdf`) field. Optional text fields override the service
//! defaults for this request: `max_processors`, `footer_margin`,
//! `header_margin`, `no_image_text`, `tolerance`.

use std::fmt::Display;
use std::str::FromStr;

use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::config::parse_flag;
use crate::parser::{ParseError, ParseOverrides, ParseResult};
use crate::state::AppState;

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a parse failure onto its HTTP status and error body
fn parse_error_response(err: ParseError) -> ApiError {
    let (status, label) = match &err {
        ParseError::Document(_) => (StatusCode::BAD_REQUEST, "Invalid document"),
        ParseError::InvalidConfig(_) => (StatusCode::UNPROCESSABLE_ENTITY, "Invalid configuration"),
        ParseError::Resource { .. } => (StatusCode::SERVICE_UNAVAILABLE, "No worker available"),
        ParseError::ShuttingDown => (StatusCode::SERVICE_UNAVAILABLE, "Service shutting down"),
        ParseError::PartialFailure { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "Extraction failed"),
        ParseError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "Extraction timed out"),
    };
    (status, Json(ErrorResponse::with_details(label, err.to_string())))
}

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/parse", post(parse_pdf))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Parse an uploaded PDF into ordered elements
async fn parse_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseResult>, ApiError> {
    let mut data: Option<Vec<u8>> = None;
    let mut overrides = ParseOverrides::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        (
            e.status(),
            Json(ErrorResponse::with_details("Failed to read upload", e.body_text())),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" | "pdf" => {
                let filename = field.file_name().map(|s| s.to_string());
                let bytes = field.bytes().await.map_err(|e| {
                    tracing::error!("Failed to read file data: {}", e);
                    (
                        e.status(),
                        Json(ErrorResponse::with_details("Failed to read file data", e.body_text())),
                    )
                })?;
                tracing::debug!(?filename, bytes = bytes.len(), "Received document");
                data = Some(bytes.to_vec());
            }
            "max_processors" => overrides.max_processors = Some(number_field(&name, field).await?),
            "footer_margin" => overrides.footer_margin = Some(number_field(&name, field).await?),
            "header_margin" => overrides.header_margin = Some(number_field(&name, field).await?),
            "tolerance" => overrides.tolerance = Some(number_field(&name, field).await?),
            "no_image_text" => {
                let raw = text_field(field).await?;
                let flag = parse_flag(&raw).ok_or_else(|| invalid_field(&name, &raw, "expected a boolean"))?;
                overrides.no_image_text = Some(flag);
            }
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    let Some(data) = data else {
        tracing::warn!("No file field found in multipart upload");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("No file provided")),
        ));
    };

    let result = state
        .parser()
        .handle_request(data, &overrides)
        .await
        .map_err(|e| {
            tracing::warn!("Parse request failed: {}", e);
            parse_error_response(e)
        })?;

    tracing::info!(
        "Parsed document with {} pages into {} elements",
        result.num_pages,
        result.elements.len()
    );
    Ok(Json(result))
}

async fn text_field(field: Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(|e| {
        (
            e.status(),
            Json(ErrorResponse::with_details("Failed to read upload", e.body_text())),
        )
    })
}

async fn number_field<T>(name: &str, field: Field<'_>) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = text_field(field).await?;
    raw.trim()
        .parse::<T>()
        .map_err(|e| invalid_field(name, &raw, &e.to_string()))
}

fn invalid_field(name: &str, raw: &str, reason: &str) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse::with_details(
            "Invalid configuration",
            format!("{name}={raw:?}: {reason}"),
        )),
    )
}
