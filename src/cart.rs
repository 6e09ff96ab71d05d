// Cart ledger: ordered (package, visit date) lines with aggregated quantities
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::pricing::{parse_price_label, CartTotals, LineTotal, FALLBACK_TAX_PERCENT};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CartLine {
    pub package_name: String,
    pub quantity: u32,
    // dd/mm/yyyy copy of the session visit date when the line was added
    pub visit_date: String,
    // display price snapshot, only read when the catalog lookup fails
    pub price: String,
}

impl CartLine {
    fn matches(&self, package_name: &str, visit_date: &str) -> bool {
        self.package_name == package_name && self.visit_date == visit_date
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartLedger {
    lines: Vec<CartLine>,
}

impl CartLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |total, l| total.saturating_add(l.quantity))
    }

    pub fn find(&self, package_name: &str, visit_date: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.matches(package_name, visit_date))
    }

    pub fn add_or_increment(&mut self, package_name: &str, visit_date: &str, price: &str) {
        match self
            .lines
            .iter_mut()
            .find(|l| l.matches(package_name, visit_date))
        {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine {
                package_name: package_name.to_string(),
                quantity: 1,
                visit_date: visit_date.to_string(),
                price: price.to_string(),
            }),
        }
        debug!(package = package_name, visit_date, lines = self.lines.len(), "cart add");
    }

    pub fn increment(&mut self, package_name: &str, visit_date: &str) -> bool {
        match self
            .lines
            .iter_mut()
            .find(|l| l.matches(package_name, visit_date))
        {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(1);
                true
            }
            None => false,
        }
    }

    // Removes the line when its quantity reaches zero
    pub fn decrement(&mut self, package_name: &str, visit_date: &str) -> bool {
        let Some(index) = self
            .lines
            .iter()
            .position(|l| l.matches(package_name, visit_date))
        else {
            return false;
        };

        let line = &mut self.lines[index];
        line.quantity -= 1;
        if line.quantity == 0 {
            self.lines.remove(index);
            debug!(package = package_name, visit_date, "cart line removed");
        }
        true
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn totals(&self, catalog: &Catalog) -> CartTotals {
        let lines = self
            .lines
            .iter()
            .map(|line| match catalog.find_by_name(&line.package_name) {
                Some(product) => LineTotal::new(
                    &line.package_name,
                    &line.visit_date,
                    line.quantity,
                    product.rate,
                    product.tax_percent,
                    true,
                ),
                None => LineTotal::new(
                    &line.package_name,
                    &line.visit_date,
                    line.quantity,
                    parse_price_label(&line.price),
                    FALLBACK_TAX_PERCENT,
                    false,
                ),
            })
            .collect();

        CartTotals::from_lines(lines)
    }
}
