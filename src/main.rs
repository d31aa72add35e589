//! PDF Parse Server
//!
//! HTTP front end for the parser service: accepts PDF uploads and returns
//! ordered text and table elements.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_parse_server::config::Config;
use pdf_parse_server::parser::ParserService;
use pdf_parse_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pdf_parse_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting PDF Parse Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Parser defaults: max_processors={}, header_margin={}, footer_margin={}, no_image_text={}, tolerance={}",
        config.parser.max_processors,
        config.parser.header_margin,
        config.parser.footer_margin,
        config.parser.no_image_text,
        config.parser.tolerance
    );

    let service = ParserService::with_mupdf(config.parser.clone(), config.pool.clone())
        .context("Failed to start parser service")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::new(config, Arc::new(service));
    let parser = state.parser_handle();
    let app = pdf_parse_server::app(state);

    // Start server with graceful shutdown
    tracing::info!("PDF Parse Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    parser.shutdown();
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
