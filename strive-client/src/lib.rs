use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::config::Config;
use crate::engine::SyncEngine;
use crate::frontend::Frontend;
use strive_persistence::StateStore;

pub mod api;
pub mod config;
pub mod engine;
pub mod frontend;

/// Wires the transport, the state store, and the engine together from one
/// config. The frontend stays the caller's choice; the terminal binary and
/// the tests pass different ones.
pub fn build_engine(config: &Config, frontend: Arc<dyn Frontend>) -> Arc<SyncEngine> {
    let api = Arc::new(ApiClient::new(config.api_base_url.clone()));
    let store = Arc::new(StateStore::new(config.state_dir.clone()));
    Arc::new(SyncEngine::new(
        api,
        store,
        frontend,
        Duration::from_secs(config.refresh_interval_secs),
    ))
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use strive_core::AppPhase;

    fn test_config(dir: &tempfile::TempDir) -> Config {
        Config {
            api_base_url: "http://127.0.0.1:1".to_string(),
            state_dir: dir.path().join("state"),
            refresh_interval_secs: 15,
        }
    }

    #[tokio::test]
    async fn test_built_engine_starts_in_init() {
        let dir = tempfile::tempdir().unwrap();
        let engine = build_engine(
            &test_config(&dir),
            Arc::new(frontend::TerminalFrontend::new()),
        );
        assert_eq!(engine.phase().await, AppPhase::Init);
        assert!(engine.session().await.is_none());
    }

    #[tokio::test]
    async fn test_built_engine_reads_theme_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        let engine = build_engine(&config, Arc::new(frontend::TerminalFrontend::new()));
        engine.set_theme(strive_types::Theme::Dark);
        drop(engine);

        // A second engine over the same state dir sees the saved theme.
        let engine = build_engine(&config, Arc::new(frontend::TerminalFrontend::new()));
        assert_eq!(engine.theme(), strive_types::Theme::Dark);
    }
}
