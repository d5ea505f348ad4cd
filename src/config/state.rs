// Application state module
// Immutable per-process state shared by every request

use std::sync::Arc;

use super::types::Config;
use crate::relay::{HttpUpstream, InferenceUpstream};

/// Application state
///
/// Built once at startup and handed to connections behind an `Arc`.
/// Nothing in here is mutated while serving.
pub struct AppState {
    pub config: Config,
    pub upstream: Arc<dyn InferenceUpstream>,
}

impl AppState {
    /// Create `AppState` with the HTTP inference client described by `config`
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let upstream = HttpUpstream::new(&config.upstream)?;
        Ok(Self::with_upstream(config, Arc::new(upstream)))
    }

    /// Create `AppState` around an already built upstream
    pub fn with_upstream(config: &Config, upstream: Arc<dyn InferenceUpstream>) -> Self {
        Self {
            config: config.clone(),
            upstream,
        }
    }
}
