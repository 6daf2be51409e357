//! Client and cache configuration.
//!
//! Both configs have defaults matching the deployed front-end and `with_*`
//! builder methods. [`ClientConfig::from_env`] overlays environment
//! variables:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `SERVICE_CENTER_API_URL` | `base_url` | `http://localhost:8080/api` |
//! | `SERVICE_CENTER_CACHE_TTL_MS` | `cache.freshness` | 10000 |
//! | `SERVICE_CENTER_DEDUPE_WINDOW_MS` | `cache.dedupe_window` | 5000 |
//! | `SERVICE_CENTER_RELEASE_DELAY_MS` | `cache.release_delay` | 1000 |
//! | `SERVICE_CENTER_TIMEOUT_SECS` | `timeout` | unset (HTTP client default) |
//! | `SERVICE_CENTER_PERCENT_POLICY` | `percentage_policy` | `permissive` |

use crate::error::{Error, Result};
use crate::invoice::PercentagePolicy;
use std::str::FromStr;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Timing windows of the request cache.
///
/// # Example
///
/// ```
/// use service_center_kit::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::default().with_freshness(Duration::from_secs(30));
/// assert_eq!(config.dedupe_window, Duration::from_secs(5));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CacheConfig {
    /// How long a successful read is served from cache, from completion.
    pub freshness: Duration,
    /// How long an in-flight read may be joined by new callers.
    pub dedupe_window: Duration,
    /// Delay between completion and clearing the in-flight marker.
    pub release_delay: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            freshness: Duration::from_secs(10),
            dedupe_window: Duration::from_secs(5),
            release_delay: Duration::from_millis(1000),
        }
    }
}

impl CacheConfig {
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn with_dedupe_window(mut self, window: Duration) -> Self {
        self.dedupe_window = window;
        self
    }

    pub fn with_release_delay(mut self, delay: Duration) -> Self {
        self.release_delay = delay;
        self
    }
}

/// Settings for [`ApiClient`](crate::ApiClient).
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    pub cache: CacheConfig,
    /// Per-request timeout. `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
    /// Validation applied to invoice percentages before saving.
    pub percentage_policy: PercentagePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache: CacheConfig::default(),
            timeout: None,
            percentage_policy: PercentagePolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ClientConfig::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_percentage_policy(mut self, policy: PercentagePolicy) -> Self {
        self.percentage_policy = policy;
        self
    }

    /// Defaults overlaid with `SERVICE_CENTER_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` naming the variable when a value is set
    /// but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClientConfig::default();

        if let Some(url) = lookup("SERVICE_CENTER_API_URL") {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::ConfigError(format!(
                    "SERVICE_CENTER_API_URL must be an http(s) URL, got '{}'",
                    url
                )));
            }
            config = config.with_base_url(url);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "SERVICE_CENTER_CACHE_TTL_MS")? {
            config.cache.freshness = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "SERVICE_CENTER_DEDUPE_WINDOW_MS")? {
            config.cache.dedupe_window = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "SERVICE_CENTER_RELEASE_DELAY_MS")? {
            config.cache.release_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "SERVICE_CENTER_TIMEOUT_SECS")? {
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(policy) = parse_var::<PercentagePolicy, _>(&lookup, "SERVICE_CENTER_PERCENT_POLICY")? {
            config.percentage_policy = policy;
        }

        debug!(
            "Client config: base_url={} freshness={:?} dedupe={:?} release={:?} policy={:?}",
            config.base_url,
            config.cache.freshness,
            config.cache.dedupe_window,
            config.cache.release_delay,
            config.percentage_policy
        );
        Ok(config)
    }

    /// Absolute URL for a path relative to the API root.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::ConfigError(format!("{}='{}': {}", name, raw, e))),
    }
}
