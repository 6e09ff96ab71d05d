// Booking submission: validation, request projection and reply interpretation
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiError, ClientConfig, DEFAULT_AGENT_CODE};
use crate::cart::CartLedger;
use crate::catalog::Catalog;
use crate::wire::{BookingReply, BookingRequest};

pub const NAME_REQUIRED: &str = "Name is required";
pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
pub const CONTACT_REQUIRED: &str = "Contact number is required";
pub const CONTACT_INVALID: &str = "Contact number must be 10 digits";
pub const BOOKING_FAILED: &str = "Booking failed";
pub const NETWORK_FAILURE: &str = "Network or server error";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub contact: String,
}

impl CustomerDetails {
    pub fn clear(&mut self) {
        self.name.clear();
        self.contact.clear();
    }
}

// Field level messages, one per invalid field
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("invalid customer details")]
pub struct ValidationErrors {
    pub name: Option<String>,
    pub contact: Option<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.contact.is_none()
    }
}

pub fn validate_customer(customer: &CustomerDetails) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if customer.name.trim().is_empty() {
        errors.name = Some(NAME_REQUIRED.to_string());
    } else if customer.name.chars().count() < 2 {
        errors.name = Some(NAME_TOO_SHORT.to_string());
    }

    if customer.contact.trim().is_empty() {
        errors.contact = Some(CONTACT_REQUIRED.to_string());
    } else if customer.contact.len() != 10 || !customer.contact.chars().all(|c| c.is_ascii_digit())
    {
        errors.contact = Some(CONTACT_INVALID.to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmation {
    pub message: String,
    pub request_id: Option<String>,
    pub total_amount: Option<String>,
    // customer details as they were when the booking went through
    pub customer: CustomerDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Confirmed(BookingConfirmation),
    Invalid(ValidationErrors),
    Failed { message: String },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Confirmed(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Confirmed(c) => Some(&c.message),
            SubmissionOutcome::Failed { message } => Some(message),
            SubmissionOutcome::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Resolved(SubmissionOutcome),
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending)
    }
}

pub fn format_booking_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

#[derive(Debug, Clone)]
pub struct SubmissionService {
    agent_code: String,
}

impl Default for SubmissionService {
    fn default() -> Self {
        Self::new(DEFAULT_AGENT_CODE)
    }
}

impl SubmissionService {
    pub fn new(agent_code: &str) -> Self {
        Self {
            agent_code: agent_code.to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.agent_code)
    }

    pub fn agent_code(&self) -> &str {
        &self.agent_code
    }

    // Lines whose package is not in the catalog are left out of the request
    pub fn build_request(
        &self,
        visit_date: Option<NaiveDate>,
        cart: &CartLedger,
        catalog: &Catalog,
        customer: &CustomerDetails,
    ) -> BookingRequest {
        let mut codes = Vec::with_capacity(cart.len());
        let mut quantities = Vec::with_capacity(cart.len());

        for line in cart.lines() {
            match catalog.find_by_name(&line.package_name) {
                Some(product) => {
                    codes.push(product.code.to_string());
                    quantities.push(line.quantity.to_string());
                }
                None => warn!(
                    package = %line.package_name,
                    quantity = line.quantity,
                    "cart line not in catalog, dropped from booking"
                ),
            }
        }

        BookingRequest {
            agent_code: self.agent_code.clone(),
            booking_date: visit_date.map(format_booking_date).unwrap_or_default(),
            prod_codes: codes.join(","),
            quantities: quantities.join(","),
            customer_name: customer.name.clone(),
            customer_mobile: customer.contact.clone(),
        }
    }

    pub fn interpret(
        &self,
        reply: Result<BookingReply, ApiError>,
        customer: &CustomerDetails,
    ) -> SubmissionOutcome {
        match reply {
            Ok(BookingReply::Confirmed {
                message,
                request_id,
                total_amount,
            }) => {
                info!(request_id = ?request_id, total_amount = ?total_amount, "booking confirmed");
                SubmissionOutcome::Confirmed(BookingConfirmation {
                    message,
                    request_id,
                    total_amount,
                    customer: customer.clone(),
                })
            }
            Ok(BookingReply::Rejected { message }) => {
                info!(%message, "booking rejected");
                let message = if message.is_empty() {
                    BOOKING_FAILED.to_string()
                } else {
                    message
                };
                SubmissionOutcome::Failed { message }
            }
            Err(e) => {
                warn!(error = %e, "error creating booking");
                SubmissionOutcome::Failed {
                    message: NETWORK_FAILURE.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::catalog;
    use test_case::test_case;

    fn customer(name: &str, contact: &str) -> CustomerDetails {
        CustomerDetails {
            name: name.to_string(),
            contact: contact.to_string(),
        }
    }

    #[test_case("123456789", Some(CONTACT_INVALID) ; "nine digits")]
    #[test_case("12345678901", Some(CONTACT_INVALID) ; "eleven digits")]
    #[test_case("1234567890", None ; "ten digits")]
    #[test_case("12345abcde", Some(CONTACT_INVALID) ; "letters")]
    #[test_case("", Some(CONTACT_REQUIRED) ; "empty")]
    fn test_contact_validation(contact: &str, expected: Option<&str>) {
        let result = validate_customer(&customer("Asha", contact));
        match expected {
            None => assert!(result.is_ok()),
            Some(message) => {
                let errors = result.unwrap_err();
                assert_eq!(errors.contact.as_deref(), Some(message));
                assert!(errors.name.is_none());
            }
        }
    }

    #[test_case("", Some(NAME_REQUIRED) ; "empty")]
    #[test_case("   ", Some(NAME_REQUIRED) ; "blank")]
    #[test_case("A", Some(NAME_TOO_SHORT) ; "one char")]
    #[test_case("Al", None ; "two chars")]
    fn test_name_validation(name: &str, expected: Option<&str>) {
        let result = validate_customer(&customer(name, "1234567890"));
        assert_eq!(result.err().and_then(|e| e.name).as_deref(), expected);
    }

    #[test]
    fn test_both_fields_reported() {
        let errors = validate_customer(&customer("", "12")).unwrap_err();
        assert_eq!(errors.name.as_deref(), Some(NAME_REQUIRED));
        assert_eq!(errors.contact.as_deref(), Some(CONTACT_INVALID));
    }

    #[test]
    fn test_build_request_keeps_cart_order() {
        let mut cart = CartLedger::new();
        cart.add_or_increment("Kids Pass", "01/06/2099", "Rs 300");
        cart.add_or_increment("Day Pass", "01/06/2099", "Rs 500");
        cart.add_or_increment("Day Pass", "01/06/2099", "Rs 500");
        cart.add_or_increment("Combo Pass", "01/06/2099", "Rs 899");

        let service = SubmissionService::default();
        let request = service.build_request(
            NaiveDate::from_ymd_opt(2099, 6, 1),
            &cart,
            &catalog(),
            &customer("Asha", "9876543210"),
        );

        assert_eq!(request.agent_code, "100");
        assert_eq!(request.booking_date, "2099/06/01");
        assert_eq!(request.prod_codes, "103,101,102");
        assert_eq!(request.quantities, "1,2,1");
        assert_eq!(request.prod_codes.split(',').count(), cart.len());
        assert_eq!(request.quantities.split(',').count(), cart.len());
        assert_eq!(request.customer_name, "Asha");
        assert_eq!(request.customer_mobile, "9876543210");
    }

    #[test]
    fn test_build_request_drops_unknown_packages() {
        let mut cart = CartLedger::new();
        cart.add_or_increment("Retired Pass", "01/06/2099", "Rs 200");
        cart.add_or_increment("Day Pass", "01/06/2099", "Rs 500");

        let request = SubmissionService::new("42").build_request(
            NaiveDate::from_ymd_opt(2099, 6, 1),
            &cart,
            &catalog(),
            &customer("Asha", "9876543210"),
        );

        assert_eq!(request.agent_code, "42");
        assert_eq!(request.prod_codes, "101");
        assert_eq!(request.quantities, "1");
    }

    #[test]
    fn test_agent_code_from_config() {
        let config = ClientConfig {
            agent_code: "257".to_string(),
            ..ClientConfig::default()
        };
        let service = SubmissionService::from_config(&config);
        assert_eq!(service.agent_code(), "257");

        let request = service.build_request(
            NaiveDate::from_ymd_opt(2099, 6, 1),
            &CartLedger::new(),
            &catalog(),
            &customer("Asha", "9876543210"),
        );
        assert_eq!(request.agent_code, "257");
        assert_eq!(
            SubmissionService::from_config(&ClientConfig::default()).agent_code(),
            DEFAULT_AGENT_CODE
        );
    }

    #[test]
    fn test_interpret_replies() {
        let service = SubmissionService::default();
        let who = customer("Asha", "9876543210");

        let rejected = service.interpret(
            Ok(BookingReply::Rejected {
                message: "Sold out".to_string(),
            }),
            &who,
        );
        assert_eq!(
            rejected,
            SubmissionOutcome::Failed {
                message: "Sold out".to_string()
            }
        );

        let blank = service.interpret(
            Ok(BookingReply::Rejected {
                message: String::new(),
            }),
            &who,
        );
        assert_eq!(blank.message(), Some(BOOKING_FAILED));

        let transport = service.interpret(Err(ApiError::ParseError("eof".to_string())), &who);
        assert_eq!(transport.message(), Some(NETWORK_FAILURE));
        assert!(!transport.is_success());

        let confirmed = service.interpret(
            Ok(BookingReply::Confirmed {
                message: "Booking created".to_string(),
                request_id: Some("R-1".to_string()),
                total_amount: Some("1180".to_string()),
            }),
            &who,
        );
        match confirmed {
            SubmissionOutcome::Confirmed(c) => {
                assert_eq!(c.request_id.as_deref(), Some("R-1"));
                assert_eq!(c.total_amount.as_deref(), Some("1180"));
                assert_eq!(c.customer, who);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
