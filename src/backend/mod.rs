//! Storage backends for cached read responses.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;

pub mod inmemory;

pub use inmemory::{InMemoryBackend, StoreStats};

/// Trait for cache backend implementations.
///
/// Abstracts storage of serialized read responses so the request cache can
/// be tested against, or swapped for, another store.
///
/// **IMPORTANT:** All methods use `&self` instead of `&mut self` to allow concurrent access.
/// Backend implementations should use interior mutability.
///
/// **ASYNC:** All methods return `Send` futures. The request cache stores a
/// completed load from a spawned task, so a backend future must be able to
/// cross threads. Implementations may still be written as `async fn`.
pub trait CacheBackend: Send + Sync + Clone + 'static {
    /// Retrieve a value by key.
    ///
    /// # Returns
    /// - `Ok(Some(bytes))` - Value found and not expired
    /// - `Ok(None)` - Miss (absent or expired)
    ///
    /// # Errors
    /// Returns `Err` if the backend itself fails
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Store a value with an optional TTL.
    ///
    /// # Arguments
    /// - `key`: Rendered request key
    /// - `value`: Serialized response envelope
    /// - `ttl`: Time-to-live. None = never expires
    ///
    /// # Errors
    /// Returns `Err` if the backend itself fails
    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove a value.
    ///
    /// # Errors
    /// Returns `Err` if the backend itself fails
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// Check if a live value exists for `key`.
    ///
    /// # Errors
    /// Returns `Err` if the backend itself fails
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send {
        async move { Ok(self.get(key).await?.is_some()) }
    }

    /// Drop every stored value.
    ///
    /// # Errors
    /// Returns `Err` if the operation is not supported or fails
    fn clear_all(&self) -> impl Future<Output = Result<()>> + Send {
        async {
            Err(crate::error::Error::BackendError(
                "clear_all not supported by this backend".to_string(),
            ))
        }
    }
}
