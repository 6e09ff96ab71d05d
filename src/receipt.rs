// Read-only booking receipt, rendered after a confirmed submission
use std::fmt;

use crate::catalog::Catalog;
use crate::pricing::{Amount, CartTotals};
use crate::session::BookingSession;
use crate::submission::{BookingConfirmation, CustomerDetails};

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    pub package_name: String,
    pub description: Option<String>,
    pub quantity: u32,
    pub rate: f64,
    pub tax_percent: f64,
    pub tax_per_unit: f64,
    pub total_per_unit: f64,
    pub base: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub customer: CustomerDetails,
    pub visit_date: Option<String>,
    pub request_id: Option<String>,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: f64,
    pub tax_total: f64,
    pub grand_total: f64,
    // backend total, which is what the customer is actually charged
    pub backend_total: Option<String>,
}

impl Receipt {
    // Customer details come from the confirmation snapshot since the session has reset them
    pub fn project(
        session: &BookingSession,
        confirmation: &BookingConfirmation,
        catalog: &Catalog,
    ) -> Self {
        let CartTotals {
            lines,
            subtotal,
            tax_total,
            grand_total,
        } = session.totals(catalog);

        let lines = lines
            .into_iter()
            .map(|line| ReceiptLine {
                description: catalog
                    .find_by_name(&line.package_name)
                    .and_then(|p| p.description.clone()),
                quantity: line.quantity,
                rate: line.rate,
                tax_percent: line.tax_percent,
                tax_per_unit: line.tax_per_unit(),
                total_per_unit: line.rate + line.tax_per_unit(),
                base: line.base,
                package_name: line.package_name,
            })
            .collect();

        Self {
            customer: confirmation.customer.clone(),
            visit_date: session.visit_date_label(),
            request_id: session.request_id().map(str::to_string),
            lines,
            subtotal,
            tax_total,
            grand_total,
            backend_total: confirmation.total_amount.clone(),
        }
    }

    // Closing the receipt has no effect on the session
    pub fn dismiss(self) {}
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Booking Receipt")?;
        writeln!(
            f,
            "Visit Date: {}",
            self.visit_date.as_deref().unwrap_or("—")
        )?;
        if let Some(request_id) = &self.request_id {
            writeln!(f, "Request ID: {}", request_id)?;
        }
        writeln!(f, "Name: {}", self.customer.name)?;
        writeln!(f, "Contact: {}", self.customer.contact)?;
        writeln!(f, "Ticket Packages")?;
        if self.lines.is_empty() {
            writeln!(f, "  No packages")?;
        }
        for line in &self.lines {
            writeln!(f, "  {}  {}", line.package_name, Amount(line.base))?;
            writeln!(
                f,
                "    {} × Rs {:.2} (Base)",
                line.quantity, line.rate
            )?;
        }
        writeln!(f, "Sub-total: {}", Amount(self.subtotal))?;
        writeln!(f, "GST Total: {}", Amount(self.tax_total))?;
        write!(f, "Grand Total: {}", Amount(self.grand_total))
    }
}
