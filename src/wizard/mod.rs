//! Step machines behind the two creation wizards.
//!
//! Each wizard owns its form state and a current step. Operations called in
//! a step that does not allow them return [`Error::InvalidTransition`];
//! input problems return [`Error::ValidationError`]. In both cases the
//! wizard records a banner message and stays where it is.
//!
//! Saving goes through a repository trait
//! ([`InvoiceRepository`](crate::repository::InvoiceRepository),
//! [`ServiceRequestRepository`](crate::repository::ServiceRequestRepository)),
//! so [`ApiClient`](crate::ApiClient) or an in-memory double can back it.
//! A failed save is never retried automatically.
//!
//! [`Error::InvalidTransition`]: crate::Error::InvalidTransition
//! [`Error::ValidationError`]: crate::Error::ValidationError

pub mod invoice;
pub mod service_request;

pub use invoice::{InvoiceStep, InvoiceWizard};
pub use service_request::{SelectedTemplate, ServiceRequestStep, ServiceRequestWizard};

/// Case-insensitive substring match over optional fields.
pub(crate) fn matches_query<'a, I>(query: &str, fields: I) -> bool
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&query))
}
