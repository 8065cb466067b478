use capfund_core::AppConfig;
use chrono::{DateTime, Utc};

/// Shared, read-only state handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Largest asset list a single request may carry.
    pub max_assets: usize,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    #[must_use]
    pub fn new(max_assets: usize) -> Self {
        Self {
            max_assets,
            started_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.allocation.max_assets)
    }
}
