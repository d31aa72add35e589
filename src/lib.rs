//! PDF Parse Server Library
//!
//! Turns uploaded PDFs into an ordered list of text and table elements.
//! The main server binary is in main.rs.
//!
//! # Modules
//!
//! - `document`: Backend-neutral document and page layout types
//! - `mupdf`: MuPDF-backed document backend
//! - `parser`: Extraction, worker pool and request orchestration
//! - `routes`: HTTP endpoints

pub mod config;
pub mod document;
#[cfg(feature = "mupdf")]
pub mod mupdf;
pub mod parser;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let max_upload_bytes = state.config().server.max_upload_bytes;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::router())
        .nest("/v1", routes::health::router())
        .nest("/v1/pdf", routes::parse::router(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
