//! Long-lived parser service
//!
//! Built once at startup and shared through the application state. Holds the
//! service-wide defaults and the single orchestrator (and with it the worker
//! pool) that every request goes through.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::config::{ParseConfig, ParseOverrides};
use super::element::ParseResult;
use super::error::ParseError;
use super::orchestrator::ParseOrchestrator;
use super::pool::{PoolConfig, PoolStats, WorkerPool};
use crate::document::DocumentBackend;

pub struct ParserService {
    defaults: ParseConfig,
    orchestrator: ParseOrchestrator,
}

impl ParserService {
    /// Create the service; rejects invalid defaults
    pub fn new(
        defaults: ParseConfig,
        pool: PoolConfig,
        backend: Arc<dyn DocumentBackend>,
    ) -> Result<Self, ParseError> {
        defaults.validate()?;

        let pool = Arc::new(WorkerPool::new(pool));
        info!(
            capacity = pool.capacity(),
            backend = backend.name(),
            "Parser service started"
        );

        Ok(Self {
            defaults,
            orchestrator: ParseOrchestrator::new(backend, pool),
        })
    }

    /// Create the service on the MuPDF backend
    #[cfg(feature = "mupdf")]
    pub fn with_mupdf(defaults: ParseConfig, pool: PoolConfig) -> Result<Self, ParseError> {
        Self::new(defaults, pool, Arc::new(crate::mupdf::MupdfBackend::new()))
    }

    /// Parse one uploaded document with request overrides applied
    pub async fn handle_request(
        &self,
        bytes: Vec<u8>,
        overrides: &ParseOverrides,
    ) -> Result<ParseResult, ParseError> {
        let request_id = Uuid::new_v4();
        let config = self.defaults.merged_with(overrides);
        let span = info_span!("parse", %request_id, bytes = bytes.len());

        async move {
            if overrides.is_empty() {
                info!("Parse request received with service defaults");
            } else {
                info!(
                    max_processors = config.max_processors,
                    header_margin = config.header_margin,
                    footer_margin = config.footer_margin,
                    no_image_text = config.no_image_text,
                    tolerance = config.tolerance,
                    "Parse request received with overrides"
                );
            }
            self.orchestrator.parse(Arc::new(bytes), &config).await
        }
        .instrument(span)
        .await
    }

    pub fn defaults(&self) -> &ParseConfig {
        &self.defaults
    }

    pub fn backend_name(&self) -> &'static str {
        self.orchestrator.backend_name()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.orchestrator.pool().stats()
    }

    pub fn is_running(&self) -> bool {
        !self.orchestrator.pool().is_closed()
    }

    /// Stop accepting work; units already running finish
    pub fn shutdown(&self) {
        info!("Parser service shutting down");
        self.orchestrator.pool().close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::element::Element;
    use crate::parser::testing::*;

    fn service(backend: Arc<FakeBackend>) -> ParserService {
        ParserService::new(ParseConfig::default(), PoolConfig::default(), backend).unwrap()
    }

    #[tokio::test]
    async fn test_handle_request_uses_defaults() {
        let svc = service(FakeBackend::new(numbered_pages(3)).shared());
        let result = svc
            .handle_request(FAKE_PDF.to_vec(), &ParseOverrides::default())
            .await
            .unwrap();
        assert_eq!(result.num_pages, 3);
        assert_eq!(result.elements[0], Element::text("Page 1", 1));
    }

    #[tokio::test]
    async fn test_overrides_apply_per_request() {
        let mut p = page(0);
        p.blocks.push(paragraph(4.0, &["Header text"]));
        p.blocks.push(paragraph(300.0, &["Body"]));
        let svc = service(FakeBackend::new(vec![p]).shared());

        let default = svc
            .handle_request(FAKE_PDF.to_vec(), &ParseOverrides::default())
            .await
            .unwrap();
        assert_eq!(default.elements.len(), 1);

        let overrides = ParseOverrides {
            header_margin: Some(0),
            ..Default::default()
        };
        let relaxed = svc.handle_request(FAKE_PDF.to_vec(), &overrides).await.unwrap();
        assert_eq!(relaxed.elements.len(), 2);

        // Defaults are untouched by a request
        assert_eq!(svc.defaults().header_margin, 10);
    }

    #[tokio::test]
    async fn test_invalid_override_rejected() {
        let svc = service(FakeBackend::new(numbered_pages(1)).shared());
        let overrides = ParseOverrides {
            max_processors: Some(0),
            ..Default::default()
        };
        let result = svc.handle_request(FAKE_PDF.to_vec(), &overrides).await;
        assert!(matches!(result, Err(ParseError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_defaults_rejected() {
        let defaults = ParseConfig {
            max_processors: 0,
            ..Default::default()
        };
        let backend = FakeBackend::new(Vec::new()).shared();
        assert!(ParserService::new(defaults, PoolConfig::default(), backend).is_err());
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_work() {
        let svc = service(FakeBackend::new(numbered_pages(1)).shared());
        assert!(svc.is_running());
        svc.shutdown();
        assert!(!svc.is_running());

        let result = svc
            .handle_request(FAKE_PDF.to_vec(), &ParseOverrides::default())
            .await;
        assert!(matches!(result, Err(ParseError::ShuttingDown)));
    }
}
