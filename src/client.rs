//! HTTP client for the service-center REST API.
//!
//! Wraps a `reqwest::Client` (cookie session, credentials on every call) and
//! one injected [`RequestCache`]. Reads go through the cache; writes never
//! do, and never invalidate anything on their own.

use crate::cache::RequestCache;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::key::RequestKey;
use crate::strategy::ReadStrategy;
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Shared API client.
///
/// Cloning is cheap and every clone shares the cookie session and the read
/// cache, so one client can be handed to every view.
///
/// # Example
///
/// ```no_run
/// use service_center_kit::{ApiClient, ClientConfig};
/// use service_center_kit::models::Customer;
///
/// # async fn run() -> service_center_kit::Result<()> {
/// let client = ApiClient::new(ClientConfig::default())?;
/// let customers: Vec<Customer> = client.get("/customers").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    cache: RequestCache,
}

impl ApiClient {
    /// Client with a fresh read cache built from `config.cache`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let cache = RequestCache::new(config.cache.clone());
        Self::with_cache(config, cache)
    }

    /// Client sharing an existing read cache.
    pub fn with_cache(config: ClientConfig, cache: RequestCache) -> Result<Self> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        info!("API client ready for {}", config.base_url);
        Ok(ApiClient {
            http,
            config: Arc::new(config),
            cache,
        })
    }

    /// Client configured from `SERVICE_CENTER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// Cached read of `path`.
    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.get_with(path, ReadStrategy::Refresh).await
    }

    /// Read of `path` with an explicit cache strategy.
    pub async fn get_with<T>(&self, path: &str, strategy: ReadStrategy) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let key = RequestKey::read(path);
        let request = self.request(Method::GET, path);
        let path = path.to_string();
        self.cache
            .fetch_with(&key, strategy, move || async move {
                read_json(request, &path).await
            })
            .await
    }

    /// Read that never touches the cache (session state).
    pub async fn get_uncached<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        read_json(self.request(Method::GET, path), path).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        info!("POST {}", path);
        read_json(self.request(Method::POST, path).json(body), path).await
    }

    /// POST without a body whose response body is ignored.
    pub async fn post_empty(&self, path: &str) -> Result<()> {
        info!("POST {}", path);
        expect_success(self.request(Method::POST, path), path).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        info!("PUT {}", path);
        read_json(self.request(Method::PUT, path).json(body), path).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        info!("DELETE {}", path);
        expect_success(self.request(Method::DELETE, path), path).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.config.url(path))
    }
}

async fn read_json<T: DeserializeOwned>(request: RequestBuilder, path: &str) -> Result<T> {
    let body = send(request, path).await?;
    serde_json::from_str(&body)
        .map_err(|e| Error::DeserializationError(format!("{}: {}", path, e)))
}

async fn expect_success(request: RequestBuilder, path: &str) -> Result<()> {
    send(request, path).await.map(|_| ())
}

async fn send(request: RequestBuilder, path: &str) -> Result<String> {
    let response = request.send().await.map_err(|e| {
        warn!("{}: server unreachable: {}", path, e);
        Error::from(e)
    })?;
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        debug!("{} -> {}", path, status.as_u16());
        return Ok(body);
    }

    let err = rejection_from_body(status.as_u16(), &body);
    if err.is_unauthenticated() {
        debug!("{} -> {} (not logged in)", path, status.as_u16());
    } else {
        warn!("{} -> {}: {}", path, status.as_u16(), err.user_message());
    }
    Err(err)
}

/// Map a non-success response to an [`Error`].
///
/// 401 and 403 become [`Error::Unauthenticated`]. Anything else becomes
/// [`Error::ServerRejected`] whose message is the first of:
///
/// 1. the values of a `validationErrors` object, joined with `", "`;
/// 2. a `message` string;
/// 3. an `error` string;
/// 4. the raw body, or the status reason when the body is empty.
pub fn rejection_from_body(status: u16, body: &str) -> Error {
    if status == 401 || status == 403 {
        return Error::Unauthenticated { status };
    }

    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let from_json = parsed.as_ref().and_then(|json| {
        if let Some(errors) = json.get("validationErrors").and_then(|v| v.as_object()) {
            let joined = errors
                .values()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            if !joined.is_empty() {
                return Some(joined);
            }
        }
        ["message", "error"].iter().find_map(|field| {
            json.get(*field)
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        })
    });

    let message = from_json.unwrap_or_else(|| {
        let raw = body.trim();
        if raw.is_empty() {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Request failed with status {}", status))
        } else {
            raw.to_string()
        }
    });
    Error::rejected(status, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_joined() {
        let body = r#"{
            "message": "Validation failed",
            "validationErrors": {"email": "Email is invalid", "fullName": "Full name is required"}
        }"#;
        let err = rejection_from_body(400, body);
        assert_eq!(
            err,
            Error::rejected(400, "Email is invalid, Full name is required")
        );
    }

    #[test]
    fn test_message_then_error_field() {
        assert_eq!(
            rejection_from_body(409, r#"{"message": "Invoice already exists"}"#).user_message(),
            "Invoice already exists"
        );
        assert_eq!(
            rejection_from_body(500, r#"{"error": "Internal Server Error", "status": 500}"#)
                .user_message(),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_raw_body_and_status_fallback() {
        assert_eq!(
            rejection_from_body(502, "Bad gateway from proxy").user_message(),
            "Bad gateway from proxy"
        );
        assert_eq!(rejection_from_body(404, "").user_message(), "Not Found");
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(
            rejection_from_body(401, ""),
            Error::Unauthenticated { status: 401 }
        );
        assert!(rejection_from_body(403, r#"{"message":"Forbidden"}"#).is_unauthenticated());
    }

    #[tokio::test]
    async fn test_client_shares_cache_between_clones() {
        let client = ApiClient::new(ClientConfig::new("http://127.0.0.1:9/api/")).unwrap();
        let clone = client.clone();
        assert_eq!(clone.config().base_url, "http://127.0.0.1:9/api");

        let seeded: Vec<u32> = client
            .cache()
            .fetch(&RequestKey::read("/brands"), || async { Ok(vec![1u32, 2]) })
            .await
            .unwrap();
        assert_eq!(seeded, vec![1, 2]);

        // Nothing listens on port 9, so only a shared entry can answer.
        let read: Vec<u32> = clone.get("/brands").await.unwrap();
        assert_eq!(read, vec![1, 2]);

        let other = ApiClient::new(ClientConfig::new("http://127.0.0.1:9/api")).unwrap();
        let err = other.get::<Vec<u32>>("/brands").await.unwrap_err();
        assert!(err.is_transport());
    }
}
