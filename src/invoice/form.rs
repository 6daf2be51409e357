use super::{InvoiceAmounts, PercentagePolicy};
use crate::error::{Error, Result};
use super::ensure_invoiceable;
use crate::models::{Id, Invoice, InvoiceInput, Job, PaymentStatus, ServiceRequest};
use crate::validation::require_id;

const SAVE_FAILED: &str = "Failed to save invoice";

/// State of the direct create/edit invoice form.
///
/// The preview always prices the jobs currently attached to the selected
/// service request, which may differ from the snapshot subtotal of an
/// invoice being edited. Saving sends percentages; the backend recomputes and
/// stores absolute amounts.
#[derive(Clone, Debug, PartialEq)]
pub struct InvoiceForm {
    editing: Option<Id>,
    service_request_id: Option<Id>,
    pub tax_percent: f64,
    pub discount_percent: f64,
    pub payment_status: PaymentStatus,
    pub notes: String,
    /// `0` means no due date.
    pub due_days: u32,
    costs: Vec<f64>,
}

impl Default for InvoiceForm {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceForm {
    /// Empty form for a new invoice.
    pub fn new() -> Self {
        InvoiceForm {
            editing: None,
            service_request_id: None,
            tax_percent: 0.0,
            discount_percent: 0.0,
            payment_status: PaymentStatus::Paid,
            notes: String::new(),
            due_days: 0,
            costs: Vec::new(),
        }
    }

    /// Form pre-filled from a persisted invoice.
    ///
    /// Stored tax/discount amounts are converted back to percentages of the
    /// stored subtotal. The due date is not carried over: re-saving without
    /// entering days leaves it unchanged on the server.
    pub fn edit(invoice: &Invoice) -> Self {
        let (tax_percent, discount_percent) = InvoiceAmounts::percentages_from_amounts(
            invoice.subtotal,
            invoice.tax,
            invoice.discount,
        );
        InvoiceForm {
            editing: Some(invoice.id),
            service_request_id: invoice.service_request_id,
            tax_percent,
            discount_percent,
            payment_status: invoice.payment_status,
            notes: invoice.notes.clone().unwrap_or_default(),
            due_days: 0,
            costs: Vec::new(),
        }
    }

    /// Id of the invoice being edited, `None` when creating.
    pub fn editing(&self) -> Option<Id> {
        self.editing
    }

    pub fn service_request_id(&self) -> Option<Id> {
        self.service_request_id
    }

    /// Requests this form may be pointed at: completed ones when creating,
    /// any when editing.
    pub fn selectable<'a>(&self, requests: &'a [ServiceRequest]) -> Vec<&'a ServiceRequest> {
        requests
            .iter()
            .filter(|r| self.editing.is_some() || r.is_completed())
            .collect()
    }

    /// Select a service request and take the costs of its jobs from `jobs`.
    ///
    /// `jobs` may be the full `/services` list; only jobs owned by `request`
    /// are kept, in list order. A new invoice needs a completed request.
    pub fn select_service_request(&mut self, request: &ServiceRequest, jobs: &[Job]) -> Result<()> {
        if self.editing.is_none() {
            ensure_invoiceable(request)?;
        }
        self.service_request_id = Some(request.id);
        self.costs = jobs
            .iter()
            .filter(|job| job.service_request_id == Some(request.id))
            .map(|job| job.cost)
            .collect();
        Ok(())
    }

    /// Job costs currently priced by the preview.
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn preview(&self) -> InvoiceAmounts {
        InvoiceAmounts::compute(
            self.costs.iter().copied(),
            self.tax_percent,
            self.discount_percent,
        )
    }

    /// Build the request body, checking the required service request, the
    /// percentages and the selected job costs against `policy`.
    pub fn to_input(&self, policy: PercentagePolicy) -> Result<InvoiceInput> {
        let service_request_id = require_id("Service request", self.service_request_id)?;
        policy.check(self.tax_percent, self.discount_percent)?;
        policy.check_costs(&self.costs)?;

        let notes = self.notes.trim();
        Ok(InvoiceInput {
            service_request_id: Some(service_request_id),
            tax: self.tax_percent,
            discount: self.discount_percent,
            payment_status: self.payment_status,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            due_days: (self.due_days > 0).then_some(self.due_days),
        })
    }

    /// Banner text for a failed save.
    pub fn save_error_message(err: &Error) -> String {
        err.message_or(SAVE_FAILED)
    }
}
