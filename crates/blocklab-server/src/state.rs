//! Application state shared by all handlers.
//!
//! `ProjectService` holds a `rusqlite::Connection`, which is `!Sync`, so it
//! sits behind `Arc<tokio::sync::Mutex<>>` and handlers await the lock. The
//! sandboxes need no lock; execution never holds the service.

use std::sync::Arc;

use blocklab_sandbox::{SandboxConfig, SandboxSet};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::service::ProjectService;

#[derive(Clone)]
pub struct AppState {
    /// The shared project service (async Mutex).
    pub service: Arc<tokio::sync::Mutex<ProjectService>>,
    /// One execution sandbox per language.
    pub sandboxes: SandboxSet,
}

impl AppState {
    /// Opens the store at `config.db_path` and builds the process sandboxes.
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let service = ProjectService::new(&config.db_path)?;
        Ok(AppState::with_parts(
            service,
            SandboxSet::from_config(config.sandbox.clone()),
        ))
    }

    /// Creates a new `AppState` with an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, ApiError> {
        let service = ProjectService::in_memory()?;
        Ok(AppState::with_parts(
            service,
            SandboxSet::from_config(SandboxConfig::default()),
        ))
    }

    pub fn with_parts(service: ProjectService, sandboxes: SandboxSet) -> Self {
        AppState {
            service: Arc::new(tokio::sync::Mutex::new(service)),
            sandboxes,
        }
    }
}
