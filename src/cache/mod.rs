//! Cache Module
//!
//! Provides in-memory caching of JSON payloads with TTL expiration.

mod entry;
mod key;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::CacheEntry;
pub use key::build_key;
pub use stats::CacheStats;
pub use store::CacheStore;

/// Cache handle shared between the discovery service and the cleanup task.
pub type SharedCache = Arc<RwLock<CacheStore>>;

/// Wraps a store for sharing.
pub fn shared(store: CacheStore) -> SharedCache {
    Arc::new(RwLock::new(store))
}
