//! # billing-lemonsqueezy
//!
//! Lemon Squeezy client for hosted checkouts, variant lookup and webhook
//! verification.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use billing_lemonsqueezy::LemonSqueezyClient;
//! use billing_core::CheckoutRequest;
//!
//! // Create client from environment
//! let client = LemonSqueezyClient::from_env()?;
//!
//! // Create checkout (falls back to LEMONSQUEEZY_DEFAULT_VARIANT_ID)
//! let session = client
//!     .create_checkout(&CheckoutRequest::new().with_metadata("user_id", "u_42"))
//!     .await?;
//!
//! // Redirect user to session.checkout_url
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use billing_lemonsqueezy::{dispatch_webhook_event, OrderCreatedData, WebhookHandler};
//!
//! struct MyHandler;
//!
//! impl WebhookHandler for MyHandler {
//!     fn on_order_created(&self, data: OrderCreatedData) -> BillingResult<()> {
//!         // Fulfill the order
//!         println!("Order {} paid!", data.order_id);
//!         Ok(())
//!     }
//! }
//!
//! // In your webhook endpoint, with the untouched request body:
//! let event = client.verify_webhook(&body, signature)?;
//! dispatch_webhook_event(&MyHandler, event)?;
//! ```

pub mod client;
pub mod config;
mod jsonapi;
pub mod webhook;

// Re-exports
pub use client::LemonSqueezyClient;
pub use config::LemonSqueezyConfig;
pub use webhook::{
    dispatch_webhook_event, sign_payload, LoggingWebhookHandler, OrderCreatedData, WebhookHandler,
    REQUIRED_WEBHOOK_EVENTS, SIGNATURE_HEADER,
};
