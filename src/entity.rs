//! Resource trait binding typed records to their REST collections.

use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

/// A record served by one REST collection.
///
/// Each implementor names its collection path and the body type accepted by
/// create/update, which is enough for
/// [`Collection`](crate::api::Collection) to provide typed
/// list/get/create/update/delete.
///
/// # Example
///
/// ```
/// use service_center_kit::entity::Resource;
/// use service_center_kit::models::Brand;
///
/// assert_eq!(Brand::collection(), "/brands");
/// assert_eq!(Brand::item_path(&4), "/brands/4");
/// ```
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identifier type (the backend uses integer ids).
    type Id: fmt::Display + Clone + Send + Sync + 'static;

    /// Body accepted by create and update.
    type Input: Serialize + Validate + Send + Sync;

    /// Identifier of this record.
    fn id(&self) -> Self::Id;

    /// Collection path relative to the API base, e.g. `/customers`.
    fn collection() -> &'static str;

    /// Path of one item in the collection.
    fn item_path(id: &Self::Id) -> String {
        format!("{}/{}", Self::collection(), id)
    }
}

/// Client-side validation run before a body is submitted.
///
/// Failures surface as [`Error::ValidationError`](crate::Error::ValidationError)
/// and never reach the network.
pub trait Validate {
    /// Check required fields and value ranges.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}
