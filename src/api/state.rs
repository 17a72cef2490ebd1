//! Application state shared by the handlers.

use std::sync::Arc;

use super::ApiConfig;
use crate::adhoc::AdHoc;
use crate::runner::CommandRunner;

/// Shared, read-only application state.
#[derive(Debug)]
pub struct AppState {
    /// Builds, executes and parses ansible commands
    pub adhoc: AdHoc,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: &ApiConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            adhoc: AdHoc::new(config.ansible_bin.clone(), runner),
        }
    }
}
