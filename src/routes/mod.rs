//! Route modules for the parse server

pub mod health;
pub mod parse;

#[cfg(test)]
pub(crate) fn test_app(
    backend: crate::parser::testing::FakeBackend,
) -> (axum::Router, crate::state::AppState) {
    use std::sync::Arc;

    use crate::config::Config;
    use crate::parser::ParserService;
    use crate::state::AppState;

    let config = Config::default();
    let service = ParserService::new(config.parser.clone(), config.pool.clone(), Arc::new(backend))
        .expect("default config is valid");
    let state = AppState::new(config, Arc::new(service));
    (crate::app(state.clone()), state)
}
