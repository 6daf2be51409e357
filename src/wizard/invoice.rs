use super::matches_query;
use crate::error::{Error, Result};
use crate::invoice::{ensure_invoiceable, InvoiceAmounts, PercentagePolicy};
use crate::models::{Invoice, InvoiceInput, PaymentStatus, ServiceRequest};
use crate::repository::InvoiceRepository;

const CREATE_FAILED: &str = "Failed to create invoice";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvoiceStep {
    SelectingServiceRequest,
    SettingPaymentTerms,
    Saved,
}

/// Invoice creation wizard: pick a completed service request, set payment
/// terms, save.
///
/// # Example
///
/// ```
/// use service_center_kit::invoice::PercentagePolicy;
/// use service_center_kit::repository::InMemoryRepository;
/// use service_center_kit::wizard::{InvoiceStep, InvoiceWizard};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let repo = InMemoryRepository::new();
/// let request = repo.seed_completed_request(vec![500.0, 1200.5]).await;
///
/// let mut wizard = InvoiceWizard::new(PercentagePolicy::default());
/// wizard.select(request).unwrap();
/// wizard.next().unwrap();
/// wizard.tax_percent = 18.0;
/// wizard.discount_percent = 10.0;
/// assert_eq!(wizard.preview().formatted()[3], "1836.54");
///
/// wizard.save(&repo).await.unwrap();
/// assert_eq!(wizard.step(), InvoiceStep::Saved);
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct InvoiceWizard {
    step: InvoiceStep,
    policy: PercentagePolicy,
    selected: Option<ServiceRequest>,
    pub tax_percent: f64,
    pub discount_percent: f64,
    pub payment_status: PaymentStatus,
    pub due_days: u32,
    pub notes: String,
    error: Option<String>,
    saved: Option<Invoice>,
}

impl InvoiceWizard {
    pub fn new(policy: PercentagePolicy) -> Self {
        InvoiceWizard {
            step: InvoiceStep::SelectingServiceRequest,
            policy,
            selected: None,
            tax_percent: 0.0,
            discount_percent: 0.0,
            payment_status: PaymentStatus::Unpaid,
            due_days: 30,
            notes: String::new(),
            error: None,
            saved: None,
        }
    }

    /// Requests that may be offered: COMPLETED only, filtered by `query`
    /// on id, vehicle number, customer name and description.
    pub fn selectable<'a>(requests: &'a [ServiceRequest], query: &str) -> Vec<&'a ServiceRequest> {
        requests
            .iter()
            .filter(|r| r.is_completed())
            .filter(|r| {
                let id = r.id.to_string();
                matches_query(
                    query,
                    [
                        Some(id.as_str()),
                        r.vehicle_number.as_deref(),
                        r.customer_name.as_deref(),
                        Some(r.description.as_str()),
                    ],
                )
            })
            .collect()
    }

    pub fn step(&self) -> InvoiceStep {
        self.step
    }

    pub fn selected(&self) -> Option<&ServiceRequest> {
        self.selected.as_ref()
    }

    /// Banner message of the last failed operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The created invoice, once saved.
    pub fn saved(&self) -> Option<&Invoice> {
        self.saved.as_ref()
    }

    /// Choose the request to invoice. Notes default to its description.
    pub fn select(&mut self, request: ServiceRequest) -> Result<()> {
        self.error = None;
        self.expect_step(InvoiceStep::SelectingServiceRequest, "select")?;
        if let Err(e) = ensure_invoiceable(&request) {
            return self.fail(e);
        }
        self.notes = request.description.clone();
        self.selected = Some(request);
        Ok(())
    }

    pub fn next(&mut self) -> Result<()> {
        self.error = None;
        self.expect_step(InvoiceStep::SelectingServiceRequest, "next")?;
        if self.selected.is_none() {
            return self.fail(Error::ValidationError(
                "Please select a service request".to_string(),
            ));
        }
        self.step = InvoiceStep::SettingPaymentTerms;
        Ok(())
    }

    pub fn back(&mut self) -> Result<()> {
        self.error = None;
        self.expect_step(InvoiceStep::SettingPaymentTerms, "back")?;
        self.step = InvoiceStep::SelectingServiceRequest;
        Ok(())
    }

    /// Preview over the selected request's jobs; zero when nothing is
    /// selected.
    pub fn preview(&self) -> InvoiceAmounts {
        let costs = self
            .selected
            .as_ref()
            .map(|r| r.job_costs())
            .unwrap_or_default();
        InvoiceAmounts::compute(costs, self.tax_percent, self.discount_percent)
    }

    /// Request body for the current terms.
    pub fn to_input(&self) -> Result<InvoiceInput> {
        let request = self.selected.as_ref().ok_or_else(|| {
            Error::ValidationError("Please select a service request".to_string())
        })?;
        self.policy.check(self.tax_percent, self.discount_percent)?;
        self.policy.check_costs(&request.job_costs())?;
        Ok(InvoiceInput {
            service_request_id: Some(request.id),
            tax: self.tax_percent,
            discount: self.discount_percent,
            payment_status: self.payment_status,
            notes: Some(self.notes.clone()),
            due_days: Some(self.due_days),
        })
    }

    /// Create the invoice. On failure the wizard stays at payment terms
    /// with the error recorded.
    pub async fn save<R: InvoiceRepository>(&mut self, repo: &R) -> Result<&Invoice> {
        self.error = None;
        self.expect_step(InvoiceStep::SettingPaymentTerms, "save")?;
        let input = match self.to_input() {
            Ok(input) => input,
            Err(e) => return self.fail(e),
        };

        match repo.create_invoice(&input).await {
            Ok(invoice) => {
                info!(
                    "Created invoice {} for service request {}",
                    invoice.invoice_number,
                    input.service_request_id.unwrap_or_default()
                );
                self.step = InvoiceStep::Saved;
                Ok(self.saved.insert(invoice))
            }
            Err(e) => {
                warn!("Invoice creation failed: {}", e);
                self.fail(e)
            }
        }
    }

    fn expect_step(&mut self, expected: InvoiceStep, op: &str) -> Result<()> {
        if self.step == expected {
            return Ok(());
        }
        let err = Error::InvalidTransition(format!("{} is not allowed in {:?}", op, self.step));
        self.error = Some(err.to_string());
        Err(err)
    }

    fn fail<T>(&mut self, err: Error) -> Result<T> {
        self.error = Some(err.message_or(CREATE_FAILED));
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, ServiceRequestStatus};
    use crate::repository::InMemoryRepository;

    fn request(id: i64, status: ServiceRequestStatus, costs: &[f64]) -> ServiceRequest {
        ServiceRequest {
            id,
            description: format!("Request {}", id),
            status,
            vehicle_id: Some(1),
            vehicle_number: Some(format!("KA-01-{:04}", id)),
            customer_id: Some(2),
            customer_name: Some("Asha Rao".to_string()),
            jobs: Some(
                costs
                    .iter()
                    .enumerate()
                    .map(|(n, cost)| Job {
                        id: n as i64 + 1,
                        description: None,
                        job_name: format!("Job {}", n),
                        cost: *cost,
                        service_request_id: Some(id),
                        user_id: None,
                        user_name: None,
                        service_template_id: None,
                        service_template_name: None,
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_only_completed_requests_selectable() {
        let requests = vec![
            request(1, ServiceRequestStatus::Completed, &[10.0]),
            request(2, ServiceRequestStatus::Pending, &[10.0]),
            request(3, ServiceRequestStatus::InProgress, &[]),
            request(4, ServiceRequestStatus::Completed, &[]),
        ];
        let ids: Vec<i64> = InvoiceWizard::selectable(&requests, "")
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 4]);

        let ids: Vec<i64> = InvoiceWizard::selectable(&requests, "ka-01-0004")
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn test_select_rejects_pending() {
        let mut wizard = InvoiceWizard::new(PercentagePolicy::Permissive);
        let err = wizard
            .select(request(2, ServiceRequestStatus::Pending, &[10.0]))
            .unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
        assert!(wizard.selected().is_none());
        assert!(wizard.error().is_some());
    }

    #[test]
    fn test_next_requires_selection() {
        let mut wizard = InvoiceWizard::new(PercentagePolicy::Permissive);
        assert!(wizard.next().is_err());
        assert_eq!(wizard.error(), Some("Please select a service request"));
        assert_eq!(wizard.step(), InvoiceStep::SelectingServiceRequest);

        wizard
            .select(request(1, ServiceRequestStatus::Completed, &[10.0]))
            .unwrap();
        wizard.next().unwrap();
        assert_eq!(wizard.step(), InvoiceStep::SettingPaymentTerms);
        assert_eq!(wizard.notes, "Request 1");
        assert_eq!(wizard.error(), None);

        wizard.back().unwrap();
        assert_eq!(wizard.step(), InvoiceStep::SelectingServiceRequest);
        assert!(matches!(wizard.back(), Err(Error::InvalidTransition(_))));
    }

    #[test]
    fn test_defaults_and_preview() {
        let mut wizard = InvoiceWizard::new(PercentagePolicy::Permissive);
        assert_eq!(wizard.payment_status, PaymentStatus::Unpaid);
        assert_eq!(wizard.due_days, 30);
        assert_eq!(wizard.preview(), InvoiceAmounts::default());

        wizard
            .select(request(1, ServiceRequestStatus::Completed, &[500.0, 1200.5]))
            .unwrap();
        wizard.tax_percent = 18.0;
        wizard.discount_percent = 10.0;
        assert_eq!(
            wizard.preview(),
            InvoiceAmounts::compute([500.0, 1200.5], 18.0, 10.0)
        );
    }

    #[tokio::test]
    async fn test_save_before_terms_is_invalid() {
        let repo = InMemoryRepository::new();
        let mut wizard = InvoiceWizard::new(PercentagePolicy::Permissive);
        let err = wizard.save(&repo).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
        assert!(repo.invoices().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_stays_and_retry_succeeds() {
        let repo = InMemoryRepository::new();
        let seeded = repo.seed_completed_request(vec![100.0]).await;
        let mut wizard = InvoiceWizard::new(PercentagePolicy::Permissive);
        wizard.select(seeded).unwrap();
        wizard.next().unwrap();

        repo.fail_next(Error::rejected(500, "Database unavailable")).await;
        assert!(wizard.save(&repo).await.is_err());
        assert_eq!(wizard.step(), InvoiceStep::SettingPaymentTerms);
        assert_eq!(wizard.error(), Some("Database unavailable"));
        assert!(repo.invoices().await.is_empty());

        let invoice = wizard.save(&repo).await.unwrap().clone();
        assert_eq!(invoice.total_amount, 100.0);
        assert_eq!(wizard.step(), InvoiceStep::Saved);
        assert_eq!(wizard.saved(), Some(&invoice));
        assert_eq!(wizard.error(), None);
    }

    #[tokio::test]
    async fn test_policy_blocks_save() {
        let repo = InMemoryRepository::new();
        let seeded = repo.seed_completed_request(vec![100.0]).await;
        let mut wizard = InvoiceWizard::new(PercentagePolicy::Strict);
        wizard.select(seeded).unwrap();
        wizard.next().unwrap();
        wizard.discount_percent = 150.0;

        assert!(matches!(
            wizard.save(&repo).await,
            Err(Error::ValidationError(_))
        ));
        assert_eq!(wizard.step(), InvoiceStep::SettingPaymentTerms);
        assert!(repo.invoices().await.is_empty());
    }

    #[tokio::test]
    async fn test_negative_job_cost_blocks_save_unless_permissive() {
        let repo = InMemoryRepository::new();
        let seeded = repo.seed_completed_request(vec![200.0, -500.0]).await;

        let mut strict = InvoiceWizard::new(PercentagePolicy::Strict);
        strict.select(seeded.clone()).unwrap();
        strict.next().unwrap();
        assert!(matches!(
            strict.save(&repo).await,
            Err(Error::ValidationError(_))
        ));
        assert_eq!(strict.step(), InvoiceStep::SettingPaymentTerms);
        assert_eq!(strict.error(), Some("Job cost cannot be negative"));
        assert!(repo.invoices().await.is_empty());

        let mut permissive = InvoiceWizard::new(PercentagePolicy::Permissive);
        permissive.select(seeded).unwrap();
        permissive.next().unwrap();
        let invoice = permissive.save(&repo).await.unwrap();
        assert_eq!(invoice.total_amount, -300.0);
    }
}
