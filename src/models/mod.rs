//! Typed request and response records for every REST collection.
//!
//! Response records mirror the backend's JSON (camelCase field names,
//! denormalized display names inline). Nullable lists are kept as
//! `Option<Vec<_>>` with slice accessors, since responses are also stored in
//! the postcard-based read cache.
//!
//! Request bodies are the `*Input` types. They implement
//! [`Validate`](crate::entity::Validate) so missing required fields are caught
//! before submission.

mod auth;
mod customer;
mod employee;
mod invoice;
mod service_request;
mod vehicle;

pub use auth::{
    AuthResponse, AuthUser, ChangePasswordInput, LoginInput, ProfileInput, RegisterInput,
};
pub use customer::{Customer, CustomerInput};
pub use employee::{Employee, EmployeeInput};
pub use invoice::{Invoice, InvoiceInput, PaymentStatus};
pub use service_request::{
    Job, JobInput, ServiceRequest, ServiceRequestInput, ServiceRequestStatus, ServiceTemplate,
    ServiceTemplateInput,
};
pub use vehicle::{Brand, BrandInput, Vehicle, VehicleInput};

/// Identifier type used by every collection.
pub type Id = i64;
