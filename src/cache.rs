//! Request cache - deduplicates and briefly memoizes read requests.
//!
//! Several views mounting at once tend to ask for the same collection within
//! a few milliseconds of each other. [`RequestCache::fetch`] collapses those
//! into one network call per key:
//!
//! ```text
//! fetch(key, loader)
//!   ├─ fresh value stored (< freshness)?      → return it, loader not called
//!   ├─ load in flight (< dedupe window old)?  → await the same shared result
//!   └─ otherwise                              → call loader, mark in flight
//!        ├─ Ok  → share the value with every waiter, store it with
//!        │        TTL = freshness if it reads back from the envelope
//!        ├─ Err → store nothing, share the error with every waiter
//!        └─ after release_delay: clear the in-flight marker
//! ```
//!
//! Loads run on their own Tokio task, so dropping every caller (a view
//! unmounting mid-request) does not cancel the request; the result is still
//! stored for the next reader. Callers that must not apply a late result
//! guard with a [`MountFlag`](crate::feed::MountFlag).
//!
//! Nothing is invalidated by writes. Stale reads up to the freshness window
//! are accepted; [`ReadStrategy::Invalidate`] and
//! [`RequestCache::invalidate`] exist for callers that opt in.

use crate::backend::{CacheBackend, InMemoryBackend};
use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::key::RequestKey;
use crate::observability::{CacheMetrics, LogMetrics};
use crate::serialization::{deserialize_from_cache, serialize_for_cache};
use crate::strategy::ReadStrategy;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{de::DeserializeOwned, Serialize};
use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of one load, shared by every waiter. The value keeps its loaded
/// type; the envelope only exists in the backend.
type SharedLoad = Shared<BoxFuture<'static, Result<Arc<dyn Any + Send + Sync>>>>;

/// Marker for a load that has not been released yet.
#[derive(Clone)]
struct InFlight {
    started_at: Instant,
    generation: u64,
    load: SharedLoad,
}

/// Injectable read cache with in-flight deduplication.
///
/// Cloning is cheap and clones share state; separately constructed caches
/// never do, so every test can build its own.
///
/// All methods must be called from within a Tokio runtime.
///
/// # Example
///
/// ```no_run
/// use service_center_kit::{CacheConfig, RequestCache, RequestKey};
///
/// # async fn demo() -> service_center_kit::Result<()> {
/// let cache = RequestCache::new(CacheConfig::default());
/// let key = RequestKey::read("/brands");
///
/// let names: Vec<String> = cache
///     .fetch(&key, || async { Ok(vec!["Toyota".to_string()]) })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RequestCache<B: CacheBackend = InMemoryBackend> {
    backend: B,
    in_flight: Arc<DashMap<String, InFlight>>,
    metrics: Arc<dyn CacheMetrics>,
    config: CacheConfig,
    generation: Arc<AtomicU64>,
}

impl RequestCache<InMemoryBackend> {
    /// Create a cache over a fresh in-memory store.
    pub fn new(config: CacheConfig) -> Self {
        RequestCache::with_backend(InMemoryBackend::new(), config)
    }
}

impl Default for RequestCache<InMemoryBackend> {
    fn default() -> Self {
        RequestCache::new(CacheConfig::default())
    }
}

impl<B: CacheBackend> RequestCache<B> {
    /// Create a cache over the given backend.
    pub fn with_backend(backend: B, config: CacheConfig) -> Self {
        RequestCache {
            backend,
            in_flight: Arc::new(DashMap::new()),
            metrics: Arc::new(LogMetrics),
            config,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: impl CacheMetrics + 'static) -> Self {
        self.metrics = Arc::new(metrics);
        self
    }

    /// Read through the cache with [`ReadStrategy::Refresh`].
    ///
    /// `loader` is only called when no fresh value and no joinable load
    /// exist. It is called while the in-flight marker is being installed, so
    /// it should only build its future and leave the work to it.
    ///
    /// Every waiter receives a clone of the loaded value. A value whose
    /// envelope does not read back (types postcard cannot decode, such as
    /// `serde_json::Value`) is still delivered but never stored, so the next
    /// read after the marker is released loads again.
    ///
    /// # Errors
    ///
    /// Returns the loader's error, shared with every joined caller.
    pub async fn fetch<T, F, Fut>(&self, key: &RequestKey, loader: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.fetch_with(key, ReadStrategy::Refresh, loader).await
    }

    /// Read with an explicit strategy.
    pub async fn fetch_with<T, F, Fut>(
        &self,
        key: &RequestKey,
        strategy: ReadStrategy,
        loader: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        debug!("» Read {} (strategy: {})", key, strategy);

        match strategy {
            ReadStrategy::Bypass => return loader().await,
            ReadStrategy::Invalidate => self.invalidate(key).await?,
            ReadStrategy::Refresh => {}
        }

        let timer = Instant::now();
        if let Some(value) = self.lookup::<T>(key).await {
            self.metrics.record_hit(key.as_str(), timer.elapsed());
            return Ok(value);
        }

        let loaded = self.join_or_start(key, loader).await?;
        match (*loaded).downcast_ref::<T>() {
            Some(value) => Ok(value.clone()),
            None => Err(Error::DeserializationError(format!(
                "{} was loaded as a different type",
                key
            ))),
        }
    }

    /// Forget the stored value and the in-flight marker for `key`.
    ///
    /// Callers already waiting on the old load still receive its result.
    pub async fn invalidate(&self, key: &RequestKey) -> Result<()> {
        self.in_flight.remove(key.as_str());
        self.backend.delete(key.as_str()).await?;
        info!("Cache INVALIDATE {}", key);
        Ok(())
    }

    /// Forget everything.
    pub async fn clear(&self) -> Result<()> {
        self.in_flight.clear();
        self.backend.clear_all().await
    }

    /// Number of keys currently marked in flight (including released-soon ones).
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Stored value for `key`, if fresh and decodable.
    ///
    /// An undecodable entry (corrupt, other schema version, other type) is
    /// evicted and reported as a miss. A failing backend is also a miss:
    /// the network stays the source of truth.
    async fn lookup<T: DeserializeOwned>(&self, key: &RequestKey) -> Option<T> {
        let bytes = match self.backend.get(key.as_str()).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache lookup failed for {}: {}", key, e);
                return None;
            }
        };

        match deserialize_from_cache::<T>(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Evicting unreadable cache entry {}: {}", key, e);
                if let Err(e) = self.backend.delete(key.as_str()).await {
                    warn!("Failed to evict {}: {}", key, e);
                }
                None
            }
        }
    }

    /// Join a recent in-flight load for `key`, or start a new one.
    fn join_or_start<T, F, Fut>(&self, key: &RequestKey, loader: F) -> SharedLoad
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let now = Instant::now();
        match self.in_flight.entry(key.as_str().to_string()) {
            Entry::Occupied(entry)
                if now.duration_since(entry.get().started_at) < self.config.dedupe_window =>
            {
                self.metrics.record_join(key.as_str());
                entry.get().load.clone()
            }
            Entry::Occupied(mut entry) => {
                debug!(
                    "In-flight read for {} is older than {:?}, starting a new one",
                    key, self.config.dedupe_window
                );
                let flight = self.start(key, loader, now);
                let load = flight.load.clone();
                entry.insert(flight);
                load
            }
            Entry::Vacant(entry) => {
                let flight = self.start(key, loader, now);
                let load = flight.load.clone();
                entry.insert(flight);
                load
            }
        }
    }

    /// Start a load on its own task and return its marker.
    fn start<T, F, Fut>(&self, key: &RequestKey, loader: F, started_at: Instant) -> InFlight
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.metrics.record_miss(key.as_str());

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let request = loader();
        let backend = self.backend.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let metrics = Arc::clone(&self.metrics);
        let freshness = self.config.freshness;
        let release_delay = self.config.release_delay;
        let key = key.as_str().to_string();

        let load = async move {
            let outcome = request.await;
            match &outcome {
                Ok(value) => match storable(value) {
                    Ok(bytes) => {
                        if let Err(e) = backend.set(&key, bytes, Some(freshness)).await {
                            warn!("Failed to store {}: {}", key, e);
                        }
                        metrics.record_set(&key, started_at.elapsed());
                    }
                    Err(e) => debug!("Not storing {}: {}", key, e),
                },
                Err(e) => metrics.record_error(&key, &e.to_string()),
            }

            release_later(in_flight, key, generation, release_delay);
            outcome.map(|value| Arc::new(value) as Arc<dyn Any + Send + Sync>)
        }
        .boxed()
        .shared();

        tokio::spawn(load.clone());

        InFlight {
            started_at,
            generation,
            load,
        }
    }
}

/// Envelope bytes for `value`, if they decode back into `T`.
fn storable<T: Serialize + DeserializeOwned>(value: &T) -> Result<Vec<u8>> {
    let bytes = serialize_for_cache(value)?;
    deserialize_from_cache::<T>(&bytes)?;
    Ok(bytes)
}

/// Clear the marker left by `generation` once `delay` has passed. A newer
/// marker for the same key is left alone.
fn release_later(
    in_flight: Arc<DashMap<String, InFlight>>,
    key: String,
    generation: u64,
    delay: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if in_flight
            .remove_if(&key, |_, flight| flight.generation == generation)
            .is_some()
        {
            debug!("Released in-flight marker for {}", key);
        }
    });
}
