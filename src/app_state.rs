// =============================================================================
// Central Application State
// =============================================================================
//
// Shared by every axum handler via `Arc<AppState>`. The store manages its own
// locking; configuration is read-only after startup.
// =============================================================================

use std::time::Instant;

use crate::config::ServiceConfig;
use crate::store::Store;

pub struct AppState {
    pub config: ServiceConfig,
    pub store: Store,
    /// Instant when the service was started. Used for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: ServiceConfig, store: Store) -> Self {
        Self {
            config,
            store,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
