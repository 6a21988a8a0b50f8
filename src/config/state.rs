// Application state module
// Shared, read-only state handed to every connection

use crate::handler::StaticServer;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    pub server: StaticServer,
    active_connections: AtomicUsize,
}

impl AppState {
    pub const fn new(config: Config, server: StaticServer) -> Self {
        Self {
            config,
            server,
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Reserve a connection slot
    ///
    /// Returns `false` when `performance.max_connections` is already reached.
    pub fn try_acquire_connection(&self) -> bool {
        let limit = self.config.performance.max_connections.unwrap_or(usize::MAX);
        self.active_connections
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < limit).then_some(n + 1)
            })
            .is_ok()
    }

    pub fn release_connection(&self) {
        self.active_connections.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Acquire)
    }
}
