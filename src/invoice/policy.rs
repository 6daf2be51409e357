use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Which tax/discount percentages are accepted before an invoice is saved.
///
/// | Policy | Negative tax or discount | Discount > 100% |
/// |--------|--------------------------|-----------------|
/// | `Permissive` (default) | accepted | accepted |
/// | `NonNegative` | rejected | accepted |
/// | `Strict` | rejected | rejected |
///
/// Non-numeric values (NaN, infinity) are rejected under every policy.
/// Nothing is ever clamped: a rejected value is reported, not adjusted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PercentagePolicy {
    #[default]
    Permissive,
    NonNegative,
    Strict,
}

impl PercentagePolicy {
    /// Check a tax/discount pair.
    ///
    /// ```
    /// use service_center_kit::invoice::PercentagePolicy;
    ///
    /// assert!(PercentagePolicy::Permissive.check(18.0, 120.0).is_ok());
    /// assert!(PercentagePolicy::Strict.check(18.0, 120.0).is_err());
    /// ```
    pub fn check(&self, tax_percent: f64, discount_percent: f64) -> Result<()> {
        finite("Tax", tax_percent)?;
        finite("Discount", discount_percent)?;

        if *self == PercentagePolicy::Permissive {
            return Ok(());
        }
        if tax_percent < 0.0 {
            return Err(Error::ValidationError(
                "Tax percentage cannot be negative".to_string(),
            ));
        }
        if discount_percent < 0.0 {
            return Err(Error::ValidationError(
                "Discount percentage cannot be negative".to_string(),
            ));
        }
        if *self == PercentagePolicy::Strict && discount_percent > 100.0 {
            return Err(Error::ValidationError(
                "Discount percentage cannot exceed 100".to_string(),
            ));
        }
        Ok(())
    }

    /// Check the job costs feeding a subtotal.
    pub fn check_costs(&self, costs: &[f64]) -> Result<()> {
        for cost in costs {
            finite("Job cost", *cost)?;
            if *self != PercentagePolicy::Permissive && *cost < 0.0 {
                return Err(Error::ValidationError(
                    "Job cost cannot be negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn finite(label: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::ValidationError(format!("{} must be a number", label)))
    }
}

impl fmt::Display for PercentagePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentagePolicy::Permissive => write!(f, "permissive"),
            PercentagePolicy::NonNegative => write!(f, "non-negative"),
            PercentagePolicy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for PercentagePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "permissive" => Ok(PercentagePolicy::Permissive),
            "non-negative" => Ok(PercentagePolicy::NonNegative),
            "strict" => Ok(PercentagePolicy::Strict),
            other => Err(Error::ConfigError(format!(
                "unknown percentage policy '{}' (expected permissive, non-negative or strict)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_accepts_observed_inputs() {
        let policy = PercentagePolicy::Permissive;
        assert!(policy.check(-5.0, 250.0).is_ok());
        assert!(policy.check_costs(&[-10.0, 20.0]).is_ok());
        assert!(policy.check(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_non_negative() {
        let policy = PercentagePolicy::NonNegative;
        assert!(policy.check(0.0, 150.0).is_ok());
        assert_eq!(
            policy.check(-1.0, 0.0).unwrap_err().user_message(),
            "Tax percentage cannot be negative"
        );
        assert!(policy.check(0.0, -1.0).is_err());
        assert!(policy.check_costs(&[0.0, 5.0]).is_ok());
        assert!(policy.check_costs(&[-0.5]).is_err());
    }

    #[test]
    fn test_strict() {
        let policy = PercentagePolicy::Strict;
        assert!(policy.check(18.0, 100.0).is_ok());
        assert_eq!(
            policy.check(18.0, 100.5).unwrap_err().user_message(),
            "Discount percentage cannot exceed 100"
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "Non_Negative".parse::<PercentagePolicy>().unwrap(),
            PercentagePolicy::NonNegative
        );
        assert_eq!(
            PercentagePolicy::Strict.to_string().parse::<PercentagePolicy>().unwrap(),
            PercentagePolicy::Strict
        );
        assert!(matches!(
            "lenient".parse::<PercentagePolicy>(),
            Err(Error::ConfigError(_))
        ));
    }
}
