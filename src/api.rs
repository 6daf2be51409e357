//! Typed endpoints on top of [`ApiClient`].
//!
//! Every REST collection is reached through [`Collection`]; collection
//! specific reads (`/service-templates/active`, `/invoices/number/{n}`, ...)
//! are inherent methods on the matching `Collection<'_, T>`.

use crate::client::ApiClient;
use crate::entity::{Resource, Validate};
use crate::error::Result;
use crate::models::{
    AuthResponse, AuthUser, Brand, ChangePasswordInput, Customer, Employee, Id, Invoice, Job,
    LoginInput, PaymentStatus, ProfileInput, RegisterInput, ServiceRequest, ServiceTemplate,
    Vehicle,
};
use crate::strategy::ReadStrategy;
use std::marker::PhantomData;

/// list/get/create/update/delete for one collection.
///
/// A `Copy` handle: methods take it by value, so their futures borrow only
/// the client and `tokio::join!(client.customers().list(), ...)` works.
pub struct Collection<'a, T: Resource> {
    client: &'a ApiClient,
    _marker: PhantomData<T>,
}

impl<T: Resource> Clone for Collection<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Resource> Copy for Collection<'_, T> {}

impl<'a, T: Resource> Collection<'a, T> {
    pub fn new(client: &'a ApiClient) -> Self {
        Collection {
            client,
            _marker: PhantomData,
        }
    }

    /// Cached list read.
    pub async fn list(self) -> Result<Vec<T>> {
        self.client.get(T::collection()).await
    }

    pub async fn list_with(self, strategy: ReadStrategy) -> Result<Vec<T>> {
        self.client.get_with(T::collection(), strategy).await
    }

    /// Cached item read.
    pub async fn get(self, id: &T::Id) -> Result<T> {
        self.client.get(&T::item_path(id)).await
    }

    pub async fn get_with(self, id: &T::Id, strategy: ReadStrategy) -> Result<T> {
        self.client.get_with(&T::item_path(id), strategy).await
    }

    /// Validate `input` locally, then create. Never cached.
    pub async fn create(self, input: &T::Input) -> Result<T> {
        input.validate()?;
        self.client.post(T::collection(), input).await
    }

    /// Validate `input` locally, then update. Never cached.
    pub async fn update(self, id: &T::Id, input: &T::Input) -> Result<T> {
        input.validate()?;
        self.client.put(&T::item_path(id), input).await
    }

    pub async fn delete(self, id: &T::Id) -> Result<()> {
        self.client.delete(&T::item_path(id)).await
    }
}

impl Collection<'_, ServiceTemplate> {
    /// Templates that may be used for new service requests.
    pub async fn active(self) -> Result<Vec<ServiceTemplate>> {
        self.client
            .get(&format!("{}/active", ServiceTemplate::collection()))
            .await
    }
}

impl Collection<'_, Invoice> {
    pub async fn by_number(self, invoice_number: &str) -> Result<Invoice> {
        self.client
            .get(&format!("{}/number/{}", Invoice::collection(), invoice_number))
            .await
    }

    pub async fn by_customer(self, customer_id: Id) -> Result<Vec<Invoice>> {
        self.client
            .get(&format!("{}/customer/{}", Invoice::collection(), customer_id))
            .await
    }

    pub async fn by_payment_status(self, status: PaymentStatus) -> Result<Vec<Invoice>> {
        self.client
            .get(&format!("{}/payment-status/{}", Invoice::collection(), status))
            .await
    }

    /// Server-rendered printable invoice. Opening it is left to the caller.
    pub fn print_url(self, id: Id) -> String {
        format!("{}/print/invoice/{}", server_root(self.client), id)
    }
}

fn server_root(client: &ApiClient) -> &str {
    let base = client.config().base_url.as_str();
    base.strip_suffix("/api").unwrap_or(base)
}

/// `/auth` endpoints. None of these are cached.
#[derive(Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        AuthApi { client }
    }

    pub async fn login(self, input: &LoginInput) -> Result<AuthResponse> {
        input.validate()?;
        self.client.post("/auth/login", input).await
    }

    pub async fn register(self, input: &RegisterInput) -> Result<AuthResponse> {
        input.validate()?;
        self.client.post("/auth/register", input).await
    }

    pub async fn logout(self) -> Result<()> {
        self.client.post_empty("/auth/logout").await
    }

    /// Current user, or `None` when not logged in (401/403).
    pub async fn me(self) -> Result<Option<AuthUser>> {
        match self.client.get_uncached::<AuthResponse>("/auth/me").await {
            Ok(response) => Ok(response.user()),
            Err(e) if e.is_unauthenticated() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn change_password(self, input: &ChangePasswordInput) -> Result<AuthResponse> {
        input.validate()?;
        self.client.put("/auth/change-password", input).await
    }

    pub async fn update_profile(self, input: &ProfileInput) -> Result<AuthResponse> {
        input.validate()?;
        self.client.put("/auth/profile", input).await
    }

    pub async fn delete_account(self) -> Result<()> {
        self.client.delete("/auth/account").await
    }
}

impl ApiClient {
    pub fn collection<T: Resource>(&self) -> Collection<'_, T> {
        Collection::new(self)
    }

    pub fn customers(&self) -> Collection<'_, Customer> {
        self.collection()
    }

    pub fn vehicles(&self) -> Collection<'_, Vehicle> {
        self.collection()
    }

    pub fn brands(&self) -> Collection<'_, Brand> {
        self.collection()
    }

    pub fn service_requests(&self) -> Collection<'_, ServiceRequest> {
        self.collection()
    }

    /// `/services`: jobs attached to service requests.
    pub fn jobs(&self) -> Collection<'_, Job> {
        self.collection()
    }

    pub fn templates(&self) -> Collection<'_, ServiceTemplate> {
        self.collection()
    }

    pub fn invoices(&self) -> Collection<'_, Invoice> {
        self.collection()
    }

    /// `/users`: employees and admins.
    pub fn users(&self) -> Collection<'_, Employee> {
        self.collection()
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }
}
