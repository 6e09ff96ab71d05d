// Backend wire formats: response envelopes and the booking form
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::catalog::Product;

const SUCCESS_STATUS: &str = "success";

// Every backend response is wrapped in this envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    #[serde(default)]
    pub response_status: String,
    #[serde(default)]
    pub response_message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.response_status == SUCCESS_STATUS
    }
}

// Form fields of POST /tempBooking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRequest {
    #[serde(rename = "agentCode")]
    pub agent_code: String,
    #[serde(rename = "bookingDate")]
    pub booking_date: String,
    #[serde(rename = "prodCodes")]
    pub prod_codes: String,
    #[serde(rename = "Qtys")]
    pub quantities: String,
    #[serde(rename = "CustomerName")]
    pub customer_name: String,
    #[serde(rename = "CustomerMobileNo")]
    pub customer_mobile: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingReply {
    Confirmed {
        message: String,
        request_id: Option<String>,
        total_amount: Option<String>,
    },
    Rejected {
        message: String,
    },
}

fn parse_envelope(body: &str) -> Result<Envelope, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::ParseError(e.to_string()))
}

// Ids and amounts arrive either as strings or as numbers
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// The product array is JSON encoded a second time inside Data.data
pub fn parse_products(body: &str) -> Result<Vec<Product>, ApiError> {
    let envelope = parse_envelope(body)?;
    if !envelope.is_success() {
        return Err(ApiError::ApiResponseError {
            status: envelope.response_status,
            message: envelope.response_message.unwrap_or_default(),
        });
    }

    let encoded = envelope
        .data
        .as_ref()
        .and_then(|data| data.get("data"))
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::ParseError("missing Data.data".to_string()))?;

    serde_json::from_str(encoded).map_err(|e| ApiError::ParseError(e.to_string()))
}

pub fn parse_booking_reply(body: &str) -> Result<BookingReply, ApiError> {
    let envelope = parse_envelope(body)?;
    let message = envelope.response_message.clone().unwrap_or_default();

    if !envelope.is_success() {
        return Ok(BookingReply::Rejected { message });
    }

    let field = |key: &str| {
        envelope
            .data
            .as_ref()
            .and_then(|data| data.get(key))
            .and_then(value_to_string)
    };

    Ok(BookingReply::Confirmed {
        request_id: field("RequestId"),
        total_amount: field("TotalAmount"),
        message,
    })
}
