//! # Checkout Types
//!
//! Request and session types for hosted checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A request to open a hosted checkout.
///
/// Every field is optional. Unset values fall back to the provider
/// configuration (default variant, success and cancel URLs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Variant to sell; falls back to the configured default variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,

    /// Opaque metadata echoed back in webhook `custom_data`
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,

    /// Redirect after successful payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,

    /// Redirect if the customer backs out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,

    /// Customer email prefill
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,

    /// Price override in minor units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_price_cents: Option<i64>,

    /// Force test or live mode; provider default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_mode: Option<bool>,
}

impl CheckoutRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkout for a specific variant
    pub fn for_variant(variant_id: impl Into<String>) -> Self {
        Self {
            variant_id: Some(variant_id.into()),
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_customer_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub fn with_urls(
        mut self,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        self.success_url = Some(success_url.into());
        self.cancel_url = Some(cancel_url.into());
        self
    }

    pub fn with_custom_price(mut self, cents: i64) -> Self {
        self.custom_price_cents = Some(cents);
        self
    }

    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = Some(test_mode);
        self
    }

    /// Resolve the variant, preferring the request over `default`.
    ///
    /// Blank strings count as absent.
    pub fn resolve_variant<'a>(&'a self, default: Option<&'a str>) -> Option<&'a str> {
        self.variant_id
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .or(default.filter(|v| !v.trim().is_empty()))
    }
}

/// A hosted checkout created at the provider.
///
/// Not persisted locally; the provider owns session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider checkout ID
    pub id: String,

    /// Hosted page to redirect the customer to
    pub checkout_url: String,

    /// Variant being purchased
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,

    /// Whether the checkout was created in test mode
    #[serde(default)]
    pub test_mode: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CheckoutSession {
    /// Check if the hosted page can still be used
    pub fn is_active(&self) -> bool {
        self.expires_at.map(|exp| exp > Utc::now()).unwrap_or(true)
    }
}
