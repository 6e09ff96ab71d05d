// Backend API client for the ticketing service
// All pricing, inventory and booking ids are owned by the backend; this is the only place that talks to it

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::Product;
use crate::wire::{parse_booking_reply, parse_products, BookingReply, BookingRequest};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP error: {status_code}")]
    HttpStatus { status_code: u16 },

    #[error("Response parse error: {0}")]
    ParseError(String),

    #[error("API error: {status} - {message}")]
    ApiResponseError { status: String, message: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::ParseError(e.to_string())
        } else {
            ApiError::NetworkError(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

pub const DEFAULT_AGENT_CODE: &str = "100";
pub const DEFAULT_IMAGE_ROUTE: &str = "UploadImages";

pub const ENV_API_BASE: &str = "TICKET_API_BASE";
pub const ENV_AGENT_CODE: &str = "TICKET_AGENT_CODE";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub agent_code: String,
    pub image_route: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            agent_code: DEFAULT_AGENT_CODE.to_string(),
            image_route: DEFAULT_IMAGE_ROUTE.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ClientError::ConfigError("base url is empty".to_string()));
        }
        Ok(Self {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var(ENV_API_BASE)
            .map_err(|_| ClientError::ConfigError(format!("{} is not set", ENV_API_BASE)))?;
        let mut config = Self::new(&base_url)?;
        if let Ok(agent_code) = std::env::var(ENV_AGENT_CODE) {
            if !agent_code.trim().is_empty() {
                config.agent_code = agent_code.trim().to_string();
            }
        }
        Ok(config)
    }

    pub fn products_url(&self) -> String {
        format!(
            "{}/api/api/getProducts?prodCode=0&search=&from=0&to=500&Active=Y",
            self.base_url
        )
    }

    pub fn booking_url(&self) -> String {
        format!("{}/tempBooking", self.base_url)
    }
}

#[async_trait]
pub trait BookingBackend: Send + Sync {
    // All active products
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError>;

    // A handled backend failure is Ok(BookingReply::Rejected); Err is transport or parse
    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingReply, ApiError>;
}

pub struct HttpBookingBackend {
    config: ClientConfig,
    http: reqwest::Client,
}

impl HttpBookingBackend {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn with_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        // Handled failures still come back as an envelope, so only give up when there is none
        if !status.is_success() && serde_json::from_str::<serde_json::Value>(&body).is_err() {
            return Err(ApiError::HttpStatus {
                status_code: status.as_u16(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl BookingBackend for HttpBookingBackend {
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.config.products_url();
        debug!(%url, "fetching products");
        let response = self.http.get(&url).send().await?;
        let body = Self::read_body(response).await?;
        parse_products(&body)
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingReply, ApiError> {
        let url = self.config.booking_url();
        info!(
            %url,
            booking_date = %request.booking_date,
            prod_codes = %request.prod_codes,
            "submitting booking"
        );
        let response = self.http.post(&url).form(request).send().await?;
        let body = Self::read_body(response).await?;
        parse_booking_reply(&body)
    }
}
