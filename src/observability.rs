//! Metrics hooks for the request cache.
//!
//! Every read that goes through [`RequestCache`](crate::RequestCache) ends in
//! exactly one of three outcomes, each with its own hook:
//!
//! | Outcome | Hook | Network call |
//! |---------|------|--------------|
//! | Fresh value in store | `record_hit` | none |
//! | Joined a pending load | `record_join` | shared |
//! | Started a load | `record_miss` | one |
//!
//! A finished load reports `record_set` on success or `record_error` on
//! failure. The default methods log through the `log` crate; implement the
//! trait to feed your own counters:
//!
//! ```
//! use service_center_kit::observability::CacheMetrics;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct NetworkCounter(AtomicUsize);
//!
//! impl CacheMetrics for NetworkCounter {
//!     fn record_miss(&self, _key: &str) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//! ```

use std::time::Duration;

/// Trait for cache metrics collection.
pub trait CacheMetrics: Send + Sync {
    /// A fresh stored value was returned.
    fn record_hit(&self, key: &str, duration: Duration) {
        debug!("Cache HIT: {} took {:?}", key, duration);
    }

    /// The caller joined a load already in flight.
    fn record_join(&self, key: &str) {
        debug!("Cache JOIN: {} (request already in flight)", key);
    }

    /// No usable value or pending load: a new load starts.
    fn record_miss(&self, key: &str) {
        debug!("Cache MISS: {} -> loading", key);
    }

    /// A load succeeded and its value was stored.
    fn record_set(&self, key: &str, duration: Duration) {
        debug!("Cache SET: {} loaded in {:?}", key, duration);
    }

    /// A load failed; nothing was stored.
    fn record_error(&self, key: &str, error: &str) {
        warn!("Cache ERROR for {}: {}", key, error);
    }
}

/// Metrics sink that logs through the `log` crate (the trait defaults).
#[derive(Clone, Default)]
pub struct LogMetrics;

impl CacheMetrics for LogMetrics {}

/// Metrics sink that records nothing.
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl CacheMetrics for NoOpMetrics {
    fn record_hit(&self, _key: &str, _duration: Duration) {}
    fn record_join(&self, _key: &str) {}
    fn record_miss(&self, _key: &str) {}
    fn record_set(&self, _key: &str, _duration: Duration) {}
    fn record_error(&self, _key: &str, _error: &str) {}
}
