//! # Billing Provider Trait
//!
//! Seam between the HTTP layer and a concrete hosted-checkout provider.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  BillingProvider (trait)                    │
//! │  ├── create_checkout()                                      │
//! │  ├── get_variant()                                          │
//! │  ├── verify_webhook()                                       │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                  ┌─────────┴─────────┐
//!                  │ LemonSqueezyClient│
//!                  └───────────────────┘
//! ```

use crate::checkout::{CheckoutRequest, CheckoutSession};
use crate::error::BillingResult;
use crate::event::WebhookEvent;
use crate::variant::Variant;
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for hosted-checkout provider implementations.
///
/// Implementations hold only immutable configuration and are safe to call
/// concurrently.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Create a hosted checkout and return the redirect URL.
    ///
    /// Single attempt; never retried internally.
    async fn create_checkout(&self, request: &CheckoutRequest) -> BillingResult<CheckoutSession>;

    /// Fetch a variant from the provider catalog.
    async fn get_variant(&self, variant_id: &str) -> BillingResult<Variant>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes, exactly as received
    /// * `signature` - Signature header from the request (empty if absent)
    fn verify_webhook(&self, payload: &[u8], signature: &str) -> BillingResult<WebhookEvent>;

    /// Get the provider name (for logging and routing).
    fn provider_name(&self) -> &'static str;

    /// Get the webhook endpoint path for this provider.
    /// Default: `/webhook/{provider_name}`
    fn webhook_path(&self) -> String {
        format!("/webhook/{}", self.provider_name())
    }
}

/// Shared, dynamically dispatched provider
pub type BoxedBillingProvider = Arc<dyn BillingProvider>;
