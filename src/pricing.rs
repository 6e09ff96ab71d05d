// Pricing helpers shared by the cart view and the receipt
use std::fmt;

// Tax rate applied when a cart line no longer resolves in the catalog
pub const FALLBACK_TAX_PERCENT: f64 = 18.0;

// "Rs 599" -> 599.0, keeping digits and the decimal point only
pub fn parse_price_label(label: &str) -> f64 {
    let digits: String = label
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().unwrap_or(0.0)
}

pub fn price_label(rate: f64) -> String {
    format!("Rs {}", rate)
}

// Amount wrapper that only rounds when displayed
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Amount(pub f64);

impl Amount {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rs {:.2}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineTotal {
    pub package_name: String,
    pub visit_date: String,
    pub quantity: u32,
    pub rate: f64,
    pub tax_percent: f64,
    pub base: f64,
    pub tax: f64,
    // false when the package fell back to the stored display price
    pub resolved: bool,
}

impl LineTotal {
    pub fn new(
        package_name: &str,
        visit_date: &str,
        quantity: u32,
        rate: f64,
        tax_percent: f64,
        resolved: bool,
    ) -> Self {
        let qty = f64::from(quantity);
        Self {
            package_name: package_name.to_string(),
            visit_date: visit_date.to_string(),
            quantity,
            rate,
            tax_percent,
            base: rate * qty,
            tax: rate * tax_percent / 100.0 * qty,
            resolved,
        }
    }

    pub fn tax_per_unit(&self) -> f64 {
        self.rate * self.tax_percent / 100.0
    }

    pub fn total(&self) -> f64 {
        self.base + self.tax
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartTotals {
    pub lines: Vec<LineTotal>,
    pub subtotal: f64,
    pub tax_total: f64,
    pub grand_total: f64,
}

impl CartTotals {
    pub fn from_lines(lines: Vec<LineTotal>) -> Self {
        let subtotal = lines.iter().map(|l| l.base).sum::<f64>();
        let tax_total = lines.iter().map(|l| l.tax).sum::<f64>();
        Self {
            lines,
            subtotal,
            tax_total,
            grand_total: subtotal + tax_total,
        }
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &LineTotal> {
        self.lines.iter().filter(|l| !l.resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Rs 599", 599.0)]
    #[test_case("Rs 1,250.50", 1250.5)]
    #[test_case("$50", 50.0)]
    #[test_case("free", 0.0)]
    fn test_parse_price_label(label: &str, expected: f64) {
        assert_eq!(parse_price_label(label), expected);
    }

    #[test]
    fn test_line_total_day_pass() {
        let line = LineTotal::new("Day Pass", "01/06/2099", 2, 500.0, 18.0, true);
        assert_eq!(line.base, 1000.0);
        assert_eq!(line.tax, 180.0);
        assert_eq!(line.tax_per_unit(), 90.0);
        assert_eq!(line.total(), 1180.0);
    }

    #[test]
    fn test_amount_rounds_on_display_only() {
        let amount = Amount(10.0 / 3.0);
        assert_eq!(amount.to_string(), "Rs 3.33");
        assert!(amount.value() > 3.333);
        assert_eq!(Amount(1180.0).to_string(), "Rs 1180.00");
    }

    #[test]
    fn test_cart_totals_sum_lines() {
        let totals = CartTotals::from_lines(vec![
            LineTotal::new("Day Pass", "01/06/2099", 2, 500.0, 18.0, true),
            LineTotal::new("Kids Pass", "01/06/2099", 1, 300.0, 12.0, false),
        ]);
        assert_eq!(totals.subtotal, 1300.0);
        assert_eq!(totals.tax_total, 216.0);
        assert_eq!(totals.grand_total, 1516.0);
        assert_eq!(totals.unresolved().count(), 1);
    }
}
