use super::{Id, Job};
use crate::entity::{Resource, Validate};
use crate::error::Result;
use crate::validation::require_id;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Unpaid => "UNPAID",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PAID" => Ok(PaymentStatus::Paid),
            "UNPAID" => Ok(PaymentStatus::Unpaid),
            other => Err(crate::Error::ValidationError(format!(
                "Unknown payment status '{}'",
                other
            ))),
        }
    }
}

/// Persisted invoice as returned by the backend.
///
/// `tax` and `discount` are stored as absolute amounts, not percentages;
/// [`InvoiceForm`](crate::invoice::InvoiceForm) converts them back when an
/// invoice is edited. `subtotal` is the snapshot taken when the invoice was
/// created and does not follow later job edits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Id,
    pub invoice_number: String,
    #[serde(default)]
    pub service_request_id: Option<Id>,
    #[serde(default)]
    pub service_request_description: Option<String>,
    #[serde(default)]
    pub customer_id: Option<Id>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub vehicle_id: Option<Id>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub vehicle_model: Option<String>,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    pub subtotal: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub discount: f64,
    pub total_amount: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub services: Option<Vec<Job>>,
}

impl Invoice {
    /// Jobs captured on the invoice.
    pub fn services(&self) -> &[Job] {
        self.services.as_deref().unwrap_or(&[])
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

/// Body for `POST /invoices` and `PUT /invoices/{id}`.
///
/// Unlike the response, `tax` and `discount` here are percentages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceInput {
    pub service_request_id: Option<Id>,
    pub tax: f64,
    pub discount: f64,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    /// Days from today until the invoice is due; `None` or `0` sets no due date.
    pub due_days: Option<u32>,
}

impl Default for InvoiceInput {
    fn default() -> Self {
        InvoiceInput {
            service_request_id: None,
            tax: 0.0,
            discount: 0.0,
            payment_status: PaymentStatus::Unpaid,
            notes: None,
            due_days: Some(30),
        }
    }
}

impl Validate for InvoiceInput {
    fn validate(&self) -> Result<()> {
        require_id("Service request", self.service_request_id)?;
        Ok(())
    }
}

impl Resource for Invoice {
    type Id = Id;
    type Input = InvoiceInput;

    fn id(&self) -> Id {
        self.id
    }

    fn collection() -> &'static str {
        "/invoices"
    }
}
