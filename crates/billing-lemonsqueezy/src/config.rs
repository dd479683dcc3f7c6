//! # Lemon Squeezy Configuration
//!
//! Configuration management for the Lemon Squeezy integration.
//! All secrets are loaded from environment variables.

use billing_core::{BillingError, BillingResult};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.lemonsqueezy.com/v1";
pub const DEFAULT_SUCCESS_URL: &str = "https://localhost:3000/admin/subscription/success";
pub const DEFAULT_CANCEL_URL: &str = "https://localhost:3000/admin/subscription/cancel";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Lemon Squeezy API configuration.
///
/// Immutable once built; hand it to [`crate::LemonSqueezyClient::new`].
#[derive(Clone)]
pub struct LemonSqueezyConfig {
    /// API key used as the bearer token
    pub api_key: String,

    /// Store that owns created checkouts
    pub store_id: String,

    /// Variant used when a checkout request names none
    pub default_variant_id: Option<String>,

    /// Signing secret for the `X-Signature` header
    pub webhook_secret: String,

    pub success_url: String,

    pub cancel_url: String,

    /// API base URL, without trailing slash (for testing/mocking)
    pub api_base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl LemonSqueezyConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `LEMONSQUEEZY_API_KEY`
    /// - `LEMONSQUEEZY_STORE_ID`
    /// - `LEMONSQUEEZY_WEBHOOK_SECRET`
    pub fn from_env() -> BillingResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> BillingResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| BillingError::Configuration(format!("{} not set", key)))
        };

        let api_key = require("LEMONSQUEEZY_API_KEY")?;
        let store_id = require("LEMONSQUEEZY_STORE_ID")?;
        let webhook_secret = require("LEMONSQUEEZY_WEBHOOK_SECRET")?;

        let timeout = match get("LEMONSQUEEZY_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    BillingError::Configuration(format!(
                        "LEMONSQUEEZY_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                        raw
                    ))
                })?;
                if secs == 0 {
                    return Err(BillingError::Configuration(
                        "LEMONSQUEEZY_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let mut config = Self::new(api_key, store_id, webhook_secret)
            .with_api_base_url(
                get("LEMONSQUEEZY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            )
            .with_timeout(timeout);

        config.default_variant_id = get("LEMONSQUEEZY_DEFAULT_VARIANT_ID");
        if let Some(url) = get("LEMONSQUEEZY_CHECKOUT_SUCCESS_URL") {
            config.success_url = url;
        }
        if let Some(url) = get("LEMONSQUEEZY_CHECKOUT_CANCEL_URL") {
            config.cancel_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        api_key: impl Into<String>,
        store_id: impl Into<String>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            store_id: store_id.into(),
            default_variant_id: None,
            webhook_secret: webhook_secret.into(),
            success_url: DEFAULT_SUCCESS_URL.to_string(),
            cancel_url: DEFAULT_CANCEL_URL.to_string(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Check the required settings are present.
    pub fn validate(&self) -> BillingResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(BillingError::Configuration(
                "LEMONSQUEEZY_API_KEY must not be empty".to_string(),
            ));
        }
        if self.store_id.trim().is_empty() {
            return Err(BillingError::Configuration(
                "LEMONSQUEEZY_STORE_ID must not be empty".to_string(),
            ));
        }
        if self.webhook_secret.is_empty() {
            return Err(BillingError::Configuration(
                "LEMONSQUEEZY_WEBHOOK_SECRET must not be empty".to_string(),
            ));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(BillingError::Configuration(format!(
                "LEMONSQUEEZY_API_BASE must be an http(s) URL, got {}",
                self.api_base_url
            )));
        }
        Ok(())
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Full URL for an API path such as `/checkouts`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set the fallback variant
    pub fn with_default_variant(mut self, variant_id: impl Into<String>) -> Self {
        self.default_variant_id = Some(variant_id.into());
        self
    }

    /// Builder: set default redirect URLs
    pub fn with_redirect_urls(
        mut self,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        self.success_url = success_url.into();
        self.cancel_url = cancel_url.into();
        self
    }

    /// Builder: set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for LemonSqueezyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemonSqueezyConfig")
            .field("api_key", &"[redacted]")
            .field("store_id", &self.store_id)
            .field("default_variant_id", &self.default_variant_id)
            .field("webhook_secret", &"[redacted]")
            .field("success_url", &self.success_url)
            .field("cancel_url", &self.cancel_url)
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
