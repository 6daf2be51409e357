//! Read strategies for cached requests.
//!
//! Writes never go through the cache, so a strategy only ever applies to a
//! read.
//!
//! | Strategy | Fresh value stored | Load in flight | Nothing usable |
//! |----------|--------------------|----------------|----------------|
//! | **Refresh** (default) | Return it | Join it | Load, store, share |
//! | **Invalidate** | Drop it, load | Drop marker, load | Load, store, share |
//! | **Bypass** | Ignore | Ignore | Load, nothing stored |
//!
//! `Invalidate` is opt-in. A mutation does not invalidate anything on its
//! own; a view that has just saved and must see its own write asks for it
//! explicitly.

/// Strategy enum controlling how one read uses the cache.
///
/// # Examples
///
/// ```
/// use service_center_kit::strategy::ReadStrategy;
///
/// assert_eq!(ReadStrategy::default(), ReadStrategy::Refresh);
/// assert_eq!(ReadStrategy::Bypass.to_string(), "Bypass");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReadStrategy {
    /// Serve fresh values, join pending loads, otherwise load and store.
    #[default]
    Refresh,

    /// Forget the stored value and pending load for this key, then behave
    /// like `Refresh`. Other callers that already joined the old load still
    /// receive its result.
    Invalidate,

    /// Call the loader directly. Nothing is read, stored or shared.
    Bypass,
}

impl std::fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadStrategy::Refresh => write!(f, "Refresh"),
            ReadStrategy::Invalidate => write!(f, "Invalidate"),
            ReadStrategy::Bypass => write!(f, "Bypass"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_display() {
        assert_eq!(ReadStrategy::Refresh.to_string(), "Refresh");
        assert_eq!(ReadStrategy::Invalidate.to_string(), "Invalidate");
        assert_eq!(ReadStrategy::Bypass.to_string(), "Bypass");
    }

    #[test]
    fn test_strategy_default() {
        assert_eq!(ReadStrategy::default(), ReadStrategy::Refresh);
    }
}
