//! Shared state handed to HTTP handlers.

use std::sync::Arc;
use std::time::Instant;

use credtrust_credentials::TrustService;

use crate::config::StorageBackend;

/// Shared state for the running node, accessible from HTTP handlers.
pub struct AppState {
    /// The trust engine. Handlers call it directly; it is safe to share
    /// across concurrent requests.
    pub service: Arc<TrustService>,
    /// Which store backs the service.
    pub backend: StorageBackend,
    /// When the node started.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: Arc<TrustService>, backend: StorageBackend) -> Self {
        Self {
            service,
            backend,
            start_time: Instant::now(),
        }
    }
}
