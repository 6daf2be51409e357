//! # service-center-kit
//!
//! Typed async client for the vehicle service-center REST API.
//!
//! ## Features
//!
//! - **Request deduplication:** repeated reads of the same resource share one
//!   in-flight call or a short-lived cached result ([`RequestCache`])
//! - **Shared invoice computation:** one pure implementation of the invoice
//!   formula used by every form ([`invoice::InvoiceAmounts`])
//! - **Typed schemas:** request/response records for every collection
//!   ([`models`])
//! - **Partial-failure reads:** dashboard lists settle independently
//!   ([`dashboard`])
//! - **Explicit lifecycle:** no global state; the client, its cache and the
//!   session are built at startup and passed where needed
//!
//! ## Quick Start
//!
//! ```no_run
//! use service_center_kit::{ApiClient, ClientConfig, Session};
//! use service_center_kit::dashboard::{load_dashboard, DashboardStats};
//! use service_center_kit::models::LoginInput;
//!
//! # async fn run() -> service_center_kit::Result<()> {
//! let client = ApiClient::new(ClientConfig::from_env()?)?;
//! let session = Session::new();
//!
//! session
//!     .login(&client, &LoginInput {
//!         username: "admin".to_string(),
//!         password: "secret".to_string(),
//!     })
//!     .await?;
//!
//! // Both reads below hit the network once.
//! let (a, b) = tokio::join!(client.customers().list(), client.customers().list());
//! assert_eq!(a?, b?);
//!
//! let stats = DashboardStats::from_snapshot(&load_dashboard(&client).await);
//! println!("{} vehicles", stats.vehicles);
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate log;

pub mod api;
pub mod backend;
pub mod cache;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod entity;
pub mod error;
pub mod feed;
pub mod invoice;
pub mod key;
pub mod models;
pub mod observability;
pub mod repository;
pub mod serialization;
pub mod session;
pub mod strategy;
pub mod validation;
pub mod wizard;

// Re-exports for convenience
pub use backend::CacheBackend;
pub use cache::RequestCache;
pub use client::ApiClient;
pub use config::{CacheConfig, ClientConfig};
pub use entity::Resource;
pub use error::{Error, Result};
pub use feed::{Feed, MountFlag};
pub use invoice::{InvoiceAmounts, PercentagePolicy};
pub use key::RequestKey;
pub use session::Session;
pub use strategy::ReadStrategy;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
