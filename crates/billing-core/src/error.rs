//! # Billing Error Types
//!
//! Typed error handling for the billing integration.
//! All billing operations return `Result<T, BillingError>`.

use thiserror::Error;

/// Core error type for all billing operations
#[derive(Debug, Error)]
pub enum BillingError {
    /// Missing or invalid settings. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider rejected our credentials (HTTP 401/403)
    #[error("Authentication with provider failed: {0}")]
    Authentication(String),

    /// Request rejected by validation, locally or by the provider
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Resource does not exist at the provider (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider 5xx, transport failure or timeout
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Webhook signature missing, malformed or wrong.
    ///
    /// Carries no detail: every rejection looks the same to the sender.
    #[error("Webhook signature mismatch")]
    SignatureMismatch,

    /// Verified webhook body is not a usable event
    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(String),
}

impl BillingError {
    /// Returns true if a caller may reasonably retry the operation.
    ///
    /// Advisory only: the client itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BillingError::ProviderUnavailable(_))
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            BillingError::Configuration(_) => 500,
            BillingError::Authentication(_) => 502,
            BillingError::InvalidRequest(_) => 400,
            BillingError::NotFound(_) => 404,
            BillingError::ProviderUnavailable(_) => 503,
            BillingError::SignatureMismatch => 400,
            BillingError::MalformedPayload(_) => 400,
        }
    }
}

/// Result type alias for billing operations
pub type BillingResult<T> = Result<T, BillingError>;
