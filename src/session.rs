// Booking session coordinator
// Owns visit date, package selection, cart, customer details and the in-flight submission for one user
use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, info};

use crate::api::{ApiError, BookingBackend};
use crate::cart::CartLedger;
use crate::catalog::{Catalog, Product};
use crate::pricing::{price_label, CartTotals};
use crate::submission::{
    validate_customer, CustomerDetails, SubmissionOutcome, SubmissionService, SubmissionState,
    ValidationErrors,
};
use crate::wire::{BookingReply, BookingRequest};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("No visit date selected")]
    NoVisitDate,

    #[error("No package selected")]
    NoPackageSelected,

    #[error("Package not in catalog: {0}")]
    UnknownPackage(String),

    #[error("Visit date {0} is in the past")]
    PastVisitDate(NaiveDate),

    #[error("A booking submission is already in progress")]
    SubmissionPending,

    #[error("No booking submission is in progress")]
    NotPending,

    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitDateChange {
    Applied,
    // cart and package selection were cleared before applying
    ClearedAndApplied,
    Declined,
}

pub fn visit_date_label(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[derive(Debug, Clone, Default)]
pub struct BookingSession {
    visit_date: Option<NaiveDate>,
    selected_package: Option<String>,
    cart: CartLedger,
    customer: CustomerDetails,
    request_id: Option<String>,
    submission: SubmissionState,
}

impl BookingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visit_date(&self) -> Option<NaiveDate> {
        self.visit_date
    }

    pub fn visit_date_label(&self) -> Option<String> {
        self.visit_date.map(visit_date_label)
    }

    pub fn selected_package(&self) -> Option<&str> {
        self.selected_package.as_deref()
    }

    pub fn selected_product<'a>(&self, catalog: &'a Catalog) -> Option<&'a Product> {
        self.selected_package
            .as_deref()
            .and_then(|name| catalog.find_by_name(name))
    }

    pub fn cart(&self) -> &CartLedger {
        &self.cart
    }

    pub fn has_items(&self) -> bool {
        !self.cart.is_empty()
    }

    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn totals(&self, catalog: &Catalog) -> CartTotals {
        self.cart.totals(catalog)
    }

    // Changing the date under a non-empty cart needs confirmation and clears the cart
    pub fn set_visit_date<F>(
        &mut self,
        date: Option<NaiveDate>,
        confirm: F,
    ) -> Result<VisitDateChange, SessionError>
    where
        F: FnOnce() -> bool,
    {
        self.set_visit_date_on(date, Local::now().date_naive(), confirm)
    }

    pub fn set_visit_date_on<F>(
        &mut self,
        date: Option<NaiveDate>,
        today: NaiveDate,
        confirm: F,
    ) -> Result<VisitDateChange, SessionError>
    where
        F: FnOnce() -> bool,
    {
        if let Some(d) = date {
            if d < today {
                return Err(SessionError::PastVisitDate(d));
            }
        }

        if self.cart.is_empty() || date == self.visit_date {
            self.visit_date = date;
            return Ok(VisitDateChange::Applied);
        }

        if !confirm() {
            debug!(current = ?self.visit_date, requested = ?date, "visit date change declined");
            return Ok(VisitDateChange::Declined);
        }

        self.cart.clear();
        self.selected_package = None;
        self.visit_date = date;
        debug!(visit_date = ?date, "visit date changed, cart cleared");
        Ok(VisitDateChange::ClearedAndApplied)
    }

    pub fn set_selected_package(&mut self, name: Option<&str>) {
        self.selected_package = name.filter(|n| !n.is_empty()).map(str::to_string);
    }

    pub fn set_customer_name(&mut self, name: &str) {
        self.customer.name = name.to_string();
    }

    // Non-digits are stripped and the number is capped at 10 digits, like the input field
    pub fn set_customer_contact(&mut self, contact: &str) {
        self.customer.contact = contact.chars().filter(char::is_ascii_digit).take(10).collect();
    }

    pub fn add_selected_to_cart(&mut self, catalog: &Catalog) -> Result<(), SessionError> {
        let date = self.visit_date.ok_or(SessionError::NoVisitDate)?;
        let name = self
            .selected_package
            .as_deref()
            .ok_or(SessionError::NoPackageSelected)?;
        let product = catalog
            .find_by_name(name)
            .ok_or_else(|| SessionError::UnknownPackage(name.to_string()))?;

        self.cart
            .add_or_increment(name, &visit_date_label(date), &price_label(product.rate));
        Ok(())
    }

    pub fn increment_line(&mut self, package_name: &str, visit_date: &str) -> bool {
        self.cart.increment(package_name, visit_date)
    }

    pub fn decrement_line(&mut self, package_name: &str, visit_date: &str) -> bool {
        self.cart.decrement(package_name, visit_date)
    }

    // Validates and moves to Pending; the caller then sends the request and completes
    pub fn begin_submission(
        &mut self,
        service: &SubmissionService,
        catalog: &Catalog,
    ) -> Result<BookingRequest, SessionError> {
        if self.submission.is_pending() {
            return Err(SessionError::SubmissionPending);
        }

        if let Err(errors) = validate_customer(&self.customer) {
            self.submission = SubmissionState::Resolved(SubmissionOutcome::Invalid(errors.clone()));
            return Err(errors.into());
        }

        let request = service.build_request(self.visit_date, &self.cart, catalog, &self.customer);
        self.submission = SubmissionState::Pending;
        Ok(request)
    }

    pub fn complete_submission(
        &mut self,
        service: &SubmissionService,
        reply: Result<BookingReply, ApiError>,
    ) -> Result<SubmissionOutcome, SessionError> {
        if !self.submission.is_pending() {
            return Err(SessionError::NotPending);
        }

        let outcome = service.interpret(reply, &self.customer);
        if let SubmissionOutcome::Confirmed(confirmation) = &outcome {
            self.request_id = confirmation.request_id.clone();
            self.customer.clear();
            info!(request_id = ?self.request_id, lines = self.cart.len(), "booking submitted");
        }
        self.submission = SubmissionState::Resolved(outcome.clone());
        Ok(outcome)
    }

    pub async fn submit(
        &mut self,
        service: &SubmissionService,
        catalog: &Catalog,
        backend: &dyn BookingBackend,
    ) -> Result<SubmissionOutcome, SessionError> {
        let request = match self.begin_submission(service, catalog) {
            Ok(request) => request,
            Err(SessionError::Validation(errors)) => return Ok(SubmissionOutcome::Invalid(errors)),
            Err(e) => return Err(e),
        };
        let reply = backend.create_booking(&request).await;
        self.complete_submission(service, reply)
    }
}
