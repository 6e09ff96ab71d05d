// Ticket booking client library
// Session state, cart pricing and booking submission against the ticketing backend

pub mod api;
pub mod cart;
pub mod catalog;
pub mod pricing;
pub mod receipt;
pub mod session;
pub mod submission;
pub mod wire;

// Re-export key types for convenience
pub use api::{ApiError, BookingBackend, ClientConfig, ClientError, HttpBookingBackend};
pub use cart::{CartLedger, CartLine};
pub use catalog::{Catalog, Product};
pub use pricing::{Amount, CartTotals, LineTotal};
pub use receipt::{Receipt, ReceiptLine};
pub use session::{BookingSession, SessionError, VisitDateChange};
pub use submission::{
    BookingConfirmation, CustomerDetails, SubmissionOutcome, SubmissionService, SubmissionState,
    ValidationErrors,
};
pub use wire::{BookingReply, BookingRequest};
