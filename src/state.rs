//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::parser::ParserService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    parser: Arc<ParserService>,
}

impl AppState {
    pub fn new(config: Config, parser: Arc<ParserService>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, parser }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the parser service
    pub fn parser(&self) -> &ParserService {
        &self.inner.parser
    }

    /// Shared handle to the parser service, for shutdown after the server drains
    pub fn parser_handle(&self) -> Arc<ParserService> {
        self.inner.parser.clone()
    }
}
