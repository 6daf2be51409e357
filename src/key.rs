//! Request key management utilities.

use std::fmt;

/// Deterministic identity of a cacheable request.
///
/// Rendered as `"<METHOD>_<path>"`, so `GET_/customers` (list) and
/// `GET_/customers/7` (item) never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestKey(String);

impl RequestKey {
    /// Build a key from an HTTP method and a path relative to the API base.
    pub fn new(method: &reqwest::Method, path: &str) -> Self {
        RequestKey(format!("{}_{}", method.as_str(), path))
    }

    /// Build the key for a read. Only reads are ever deduplicated, so this
    /// is the constructor the client uses.
    pub fn read(path: &str) -> Self {
        Self::new(&reqwest::Method::GET, path)
    }

    /// Build a read key for an item inside a collection.
    pub fn item(collection: &str, id: &dyn fmt::Display) -> Self {
        Self::read(&format!("{}/{}", collection, id))
    }

    /// Split a rendered key back into method and path.
    pub fn parse(key: &str) -> Option<(&str, &str)> {
        key.split_once('_')
    }

    /// Rendered form, used as the storage key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
