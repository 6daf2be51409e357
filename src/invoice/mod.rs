//! Invoice computation shared by every place that prices an invoice.
//!
//! ```text
//! subtotal        = sum(job costs)
//! tax_amount      = subtotal * tax% / 100
//! discount_amount = subtotal * discount% / 100
//! total           = subtotal + tax_amount - discount_amount
//! ```
//!
//! [`InvoiceAmounts::compute`] is the only implementation of that formula.
//! The creation wizard and the edit form both call it, so the same inputs
//! always give bit-identical results. Values stay unrounded `f64`; only
//! [`format_money`] rounds, to two decimals, for display.
//!
//! Percentages are never clamped. Whether a discount above 100% (a negative
//! total) is acceptable is decided by the configured [`PercentagePolicy`].

mod amounts;
mod form;
mod policy;

use crate::error::{Error, Result};
use crate::models::ServiceRequest;

pub use amounts::{format_money, InvoiceAmounts};
pub use form::InvoiceForm;
pub use policy::PercentagePolicy;

/// Only completed service requests may receive a new invoice.
pub(crate) fn ensure_invoiceable(request: &ServiceRequest) -> Result<()> {
    if request.is_completed() {
        return Ok(());
    }
    Err(Error::ValidationError(format!(
        "Service request #{} is {}; only completed requests can be invoiced",
        request.id, request.status
    )))
}
