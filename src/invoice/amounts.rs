use serde::{Deserialize, Serialize};

/// The four monetary fields of an invoice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceAmounts {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount_amount: f64,
    pub total: f64,
}

impl InvoiceAmounts {
    /// Price a set of job costs.
    ///
    /// Costs are summed left to right in the order given.
    ///
    /// # Example
    ///
    /// ```
    /// use service_center_kit::invoice::{format_money, InvoiceAmounts};
    ///
    /// let amounts = InvoiceAmounts::compute([500.00, 1200.50], 18.0, 10.0);
    /// assert_eq!(format_money(amounts.subtotal), "1700.50");
    /// assert_eq!(format_money(amounts.tax_amount), "306.09");
    /// assert_eq!(format_money(amounts.discount_amount), "170.05");
    /// assert_eq!(format_money(amounts.total), "1836.54");
    /// ```
    pub fn compute<I>(costs: I, tax_percent: f64, discount_percent: f64) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let subtotal = costs.into_iter().fold(0.0, |sum, cost| sum + cost);
        Self::from_subtotal(subtotal, tax_percent, discount_percent)
    }

    /// Price an already known subtotal.
    pub fn from_subtotal(subtotal: f64, tax_percent: f64, discount_percent: f64) -> Self {
        let tax_amount = subtotal * tax_percent / 100.0;
        let discount_amount = subtotal * discount_percent / 100.0;
        InvoiceAmounts {
            subtotal,
            tax_amount,
            discount_amount,
            total: subtotal + tax_amount - discount_amount,
        }
    }

    /// Recover `(tax%, discount%)` from the absolute amounts a persisted
    /// invoice stores. A zero subtotal gives `(0, 0)`.
    pub fn percentages_from_amounts(
        subtotal: f64,
        tax_amount: f64,
        discount_amount: f64,
    ) -> (f64, f64) {
        if subtotal > 0.0 {
            (
                tax_amount / subtotal * 100.0,
                discount_amount / subtotal * 100.0,
            )
        } else {
            (0.0, 0.0)
        }
    }

    /// Each field formatted for display, in field order.
    pub fn formatted(&self) -> [String; 4] {
        [
            format_money(self.subtotal),
            format_money(self.tax_amount),
            format_money(self.discount_amount),
            format_money(self.total),
        ]
    }

    pub fn is_negative(&self) -> bool {
        self.total < 0.0
    }
}

/// Two-decimal display form, without currency symbol.
pub fn format_money(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_invoice() {
        let amounts = InvoiceAmounts::compute(vec![500.00, 1200.50], 18.0, 10.0);
        assert_eq!(amounts.subtotal, 1700.50);
        assert_eq!(
            amounts.formatted(),
            [
                "1700.50".to_string(),
                "306.09".to_string(),
                "170.05".to_string(),
                "1836.54".to_string()
            ]
        );
        assert!((amounts.total - 1836.54).abs() < 1e-9);
    }

    #[test]
    fn test_empty_costs() {
        let amounts = InvoiceAmounts::compute(Vec::new(), 5.0, 0.0);
        assert_eq!(amounts, InvoiceAmounts::default());
        assert_eq!(format_money(amounts.total), "0.00");
    }

    #[test]
    fn test_total_is_unrounded() {
        let amounts = InvoiceAmounts::compute([0.1, 0.2], 0.0, 0.0);
        assert_eq!(amounts.subtotal, 0.1 + 0.2);
        assert_ne!(amounts.total, 0.3);
        assert_eq!(format_money(amounts.total), "0.30");
    }

    #[test]
    fn test_discount_over_hundred_goes_negative() {
        let amounts = InvoiceAmounts::compute([100.0], 0.0, 150.0);
        assert_eq!(amounts.total, -50.0);
        assert!(amounts.is_negative());
    }

    #[test]
    fn test_same_inputs_same_bits() {
        let a = InvoiceAmounts::compute([19.99, 5.01, 0.333], 12.5, 7.25);
        let b = InvoiceAmounts::compute([19.99, 5.01, 0.333], 12.5, 7.25);
        assert_eq!(a.total.to_bits(), b.total.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_percentages_from_amounts() {
        let (tax, discount) = InvoiceAmounts::percentages_from_amounts(1000.0, 180.0, 50.0);
        assert_eq!(tax, 18.0);
        assert_eq!(discount, 5.0);

        assert_eq!(
            InvoiceAmounts::percentages_from_amounts(0.0, 12.0, 3.0),
            (0.0, 0.0)
        );
    }
}
