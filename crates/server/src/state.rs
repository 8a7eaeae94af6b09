use std::path::Path;

use clipmill_core::{Config, SessionRunner, StatusTracker};

/// Shared application state
pub struct AppState {
    config: Config,
    runner: SessionRunner,
}

impl AppState {
    pub fn new(config: Config, runner: SessionRunner) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn runner(&self) -> &SessionRunner {
        &self.runner
    }

    pub fn tracker(&self) -> &StatusTracker {
        self.runner.tracker()
    }

    pub fn sessions_dir(&self) -> &Path {
        &self.config.server.sessions_dir
    }
}
