//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::readings::ReadingsService;
use crate::store::{AccountStore, Database, DeviceStore};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Record database (used directly by readiness checks)
    pub db: Database,
    pub accounts: AccountStore,
    pub devices: DeviceStore,
    /// Fetches and summarizes device feeds
    pub readings: ReadingsService,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(db: Database, readings: ReadingsService, config: ApiConfig) -> Self {
        Self {
            accounts: AccountStore::new(db.clone()),
            devices: DeviceStore::new(db.clone()),
            db,
            readings,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory state whose readings source replays `feed`
    pub(crate) fn for_tests(feed: crate::readings::FeedResponse) -> Self {
        use crate::readings::testing::StaticSource;

        Self::for_tests_with(Arc::new(StaticSource::new(feed)), ApiConfig::default())
    }

    /// In-memory state over an arbitrary readings source
    pub(crate) fn for_tests_with(
        source: Arc<dyn crate::readings::ReadingSource>,
        config: ApiConfig,
    ) -> Self {
        use crate::config::ReadingsConfig;

        Self::new(
            Database::in_memory().expect("in-memory database"),
            ReadingsService::new(source, ReadingsConfig::default()),
            config,
        )
    }
}
