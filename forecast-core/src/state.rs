//! Application state shared across handlers

use std::sync::Arc;

use crate::config::Config;

/// Shared state for the core routes
///
/// Services embedding these routes in a larger state implement
/// `FromRef<TheirState> for AppState`.
#[derive(Clone, Default)]
pub struct AppState {
    config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl From<Config> for AppState {
    fn from(config: Config) -> Self {
        Self::new(config)
    }
}
