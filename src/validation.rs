//! Input validation helpers shared by the request bodies.
//!
//! Every helper returns [`Error::ValidationError`] with a message that can be
//! shown inline next to the form, e.g. `"Full name is required"`.

use crate::error::{Error, Result};

/// Validates that a text field is present and not blank.
///
/// ```
/// use service_center_kit::validation::require_text;
///
/// assert!(require_text("Full name", "Asha Rao").is_ok());
/// assert!(require_text("Full name", "   ").is_err());
/// ```
pub fn require_text(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::ValidationError(format!("{} is required", label)));
    }
    Ok(())
}

/// Validates that an optional reference (foreign key) was chosen.
pub fn require_id(label: &str, value: Option<i64>) -> Result<i64> {
    value.ok_or_else(|| Error::ValidationError(format!("{} is required", label)))
}

/// Validates a monetary amount: finite and not negative.
pub fn non_negative_amount(label: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::ValidationError(format!(
            "{} must be a number",
            label
        )));
    }
    if value < 0.0 {
        return Err(Error::ValidationError(format!(
            "{} cannot be negative",
            label
        )));
    }
    Ok(())
}

/// Validates an optional email: when given it needs a local part and a domain.
pub fn optional_email(value: Option<&str>) -> Result<()> {
    let Some(email) = value.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(Error::ValidationError(format!(
            "'{}' is not a valid email address",
            email
        ))),
    }
}
