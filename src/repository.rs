//! Write-side repository traits used by the creation wizards.
//!
//! The wizards only need "create" operations, so they depend on these small
//! traits instead of on [`ApiClient`] directly. That keeps the step machines
//! testable without a server: [`InMemoryRepository`] plays the backend's
//! part and can be told to fail.
//!
//! # Example
//!
//! ```
//! use service_center_kit::models::{InvoiceInput, PaymentStatus};
//! use service_center_kit::repository::{InMemoryRepository, InvoiceRepository};
//!
//! # tokio_test_block_on(async {
//! let repo = InMemoryRepository::new();
//! let request = repo.seed_completed_request(vec![500.0, 1200.5]).await;
//!
//! let invoice = repo
//!     .create_invoice(&InvoiceInput {
//!         service_request_id: Some(request.id),
//!         tax: 18.0,
//!         discount: 10.0,
//!         payment_status: PaymentStatus::Unpaid,
//!         notes: None,
//!         due_days: Some(30),
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(invoice.subtotal, 1700.5);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::invoice::InvoiceAmounts;
use crate::models::{
    Id, Invoice, InvoiceInput, Job, JobInput, ServiceRequest, ServiceRequestInput,
    ServiceRequestStatus,
};
use chrono::{Duration, Local};
use tokio::sync::Mutex;

/// Creates invoices.
#[allow(async_fn_in_trait)]
pub trait InvoiceRepository: Send + Sync {
    /// Persist a new invoice. The backend computes and returns the
    /// authoritative amounts.
    ///
    /// # Errors
    /// Returns `Err` when the backend rejects the invoice or is unreachable.
    async fn create_invoice(&self, input: &InvoiceInput) -> Result<Invoice>;
}

/// Creates service requests and their jobs.
#[allow(async_fn_in_trait)]
pub trait ServiceRequestRepository: Send + Sync {
    async fn create_service_request(&self, input: &ServiceRequestInput) -> Result<ServiceRequest>;

    async fn create_job(&self, input: &JobInput) -> Result<Job>;
}

impl InvoiceRepository for ApiClient {
    async fn create_invoice(&self, input: &InvoiceInput) -> Result<Invoice> {
        self.invoices().create(input).await
    }
}

impl ServiceRequestRepository for ApiClient {
    async fn create_service_request(&self, input: &ServiceRequestInput) -> Result<ServiceRequest> {
        self.service_requests().create(input).await
    }

    async fn create_job(&self, input: &JobInput) -> Result<Job> {
        self.jobs().create(input).await
    }
}

// ============================================================================
// In-Memory Repository
// ============================================================================

#[derive(Default)]
struct Store {
    next_id: Id,
    service_requests: Vec<ServiceRequest>,
    jobs: Vec<Job>,
    invoices: Vec<Invoice>,
    fail_next: Option<Error>,
}

impl Store {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn take_failure(&mut self) -> Result<()> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// In-process stand-in for the backend's write endpoints.
///
/// Invoices are priced the way the backend prices them: subtotal from the
/// request's jobs, tax and discount returned as absolute amounts. Creating a
/// second invoice for a request, or one for a request that is not
/// COMPLETED, is rejected.
#[derive(Default)]
pub struct InMemoryRepository {
    store: Mutex<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next create call fail with `err`.
    pub async fn fail_next(&self, err: Error) {
        self.store.lock().await.fail_next = Some(err);
    }

    /// Add a COMPLETED service request with one job per cost.
    pub async fn seed_completed_request(&self, costs: Vec<f64>) -> ServiceRequest {
        let mut store = self.store.lock().await;
        let id = store.next_id();
        let mut jobs = Vec::with_capacity(costs.len());
        for (n, cost) in costs.into_iter().enumerate() {
            let job_id = store.next_id();
            jobs.push(Job {
                id: job_id,
                description: None,
                job_name: format!("Job {}", n + 1),
                cost,
                service_request_id: Some(id),
                user_id: None,
                user_name: None,
                service_template_id: None,
                service_template_name: None,
            });
        }
        store.jobs.extend(jobs.iter().cloned());

        let request = ServiceRequest {
            id,
            description: format!("Service request {}", id),
            status: ServiceRequestStatus::Completed,
            vehicle_id: None,
            vehicle_number: None,
            customer_id: None,
            customer_name: None,
            jobs: Some(jobs),
        };
        store.service_requests.push(request.clone());
        request
    }

    pub async fn service_requests(&self) -> Vec<ServiceRequest> {
        self.store.lock().await.service_requests.clone()
    }

    pub async fn jobs(&self) -> Vec<Job> {
        self.store.lock().await.jobs.clone()
    }

    pub async fn invoices(&self) -> Vec<Invoice> {
        self.store.lock().await.invoices.clone()
    }
}

impl InvoiceRepository for InMemoryRepository {
    async fn create_invoice(&self, input: &InvoiceInput) -> Result<Invoice> {
        let mut store = self.store.lock().await;
        store.take_failure()?;

        let request_id = input
            .service_request_id
            .ok_or_else(|| Error::rejected(400, "Service request is required"))?;
        let request = store
            .service_requests
            .iter()
            .find(|r| r.id == request_id)
            .cloned()
            .ok_or_else(|| {
                Error::rejected(404, format!("ServiceRequest not found with id: {}", request_id))
            })?;
        if !request.is_completed() {
            return Err(Error::rejected(
                400,
                "Invoice can only be created for a completed service request",
            ));
        }
        if store
            .invoices
            .iter()
            .any(|i| i.service_request_id == Some(request_id))
        {
            return Err(Error::rejected(
                400,
                "Invoice already exists for this service request",
            ));
        }

        let jobs: Vec<Job> = store
            .jobs
            .iter()
            .filter(|j| j.service_request_id == Some(request_id))
            .cloned()
            .collect();
        let amounts =
            InvoiceAmounts::compute(jobs.iter().map(|j| j.cost), input.tax, input.discount);
        let now = Local::now().naive_local();
        let id = store.next_id();

        let invoice = Invoice {
            id,
            invoice_number: format!("INV-{:06}-{:04}", now.and_utc().timestamp() % 1_000_000, id),
            service_request_id: Some(request_id),
            service_request_description: Some(request.description.clone()),
            customer_id: request.customer_id,
            customer_name: request.customer_name.clone(),
            customer_email: None,
            customer_phone: None,
            vehicle_id: request.vehicle_id,
            vehicle_number: request.vehicle_number.clone(),
            vehicle_model: None,
            vehicle_type: None,
            subtotal: amounts.subtotal,
            tax: amounts.tax_amount,
            discount: amounts.discount_amount,
            total_amount: amounts.total,
            payment_status: input.payment_status,
            notes: input.notes.clone(),
            created_at: Some(now),
            due_date: input
                .due_days
                .filter(|days| *days > 0)
                .map(|days| now + Duration::days(i64::from(days))),
            services: Some(jobs),
        };
        store.invoices.push(invoice.clone());
        Ok(invoice)
    }
}

impl ServiceRequestRepository for InMemoryRepository {
    async fn create_service_request(&self, input: &ServiceRequestInput) -> Result<ServiceRequest> {
        let mut store = self.store.lock().await;
        store.take_failure()?;

        let id = store.next_id();
        let request = ServiceRequest {
            id,
            description: input.description.clone(),
            status: input.status,
            vehicle_id: input.vehicle_id,
            vehicle_number: None,
            customer_id: None,
            customer_name: None,
            jobs: Some(Vec::new()),
        };
        store.service_requests.push(request.clone());
        Ok(request)
    }

    async fn create_job(&self, input: &JobInput) -> Result<Job> {
        let mut store = self.store.lock().await;
        store.take_failure()?;

        let request_id = input
            .service_request_id
            .ok_or_else(|| Error::rejected(400, "Service request is required"))?;
        let id = store.next_id();
        let job = Job {
            id,
            description: input.description.clone(),
            job_name: input.job_name.clone(),
            cost: input.cost,
            service_request_id: Some(request_id),
            user_id: input.user_id,
            user_name: None,
            service_template_id: input.service_template_id,
            service_template_name: None,
        };
        store.jobs.push(job.clone());
        if let Some(request) = store.service_requests.iter_mut().find(|r| r.id == request_id) {
            request.jobs.get_or_insert_with(Vec::new).push(job.clone());
        }
        Ok(job)
    }
}
