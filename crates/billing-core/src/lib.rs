//! # billing-core
//!
//! Core types and traits for the Lemon Squeezy billing integration.
//!
//! This crate provides:
//! - `BillingProvider` trait implemented by hosted-checkout clients
//! - `CheckoutRequest` and `CheckoutSession` for the checkout flow
//! - `Variant` for catalog lookups
//! - `WebhookEvent` for verified provider callbacks
//! - `BillingError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use billing_core::{BillingProvider, CheckoutRequest};
//!
//! let request = CheckoutRequest::for_variant("12345")
//!     .with_customer_email("buyer@example.com")
//!     .with_metadata("user_id", "u_42");
//!
//! let session = provider.create_checkout(&request).await?;
//!
//! // Redirect user to session.checkout_url
//! ```

pub mod checkout;
pub mod error;
pub mod event;
pub mod provider;
pub mod variant;

// Re-exports for convenience
pub use checkout::{CheckoutRequest, CheckoutSession};
pub use error::{BillingError, BillingResult};
pub use event::{WebhookEvent, WebhookEventType};
pub use provider::{BillingProvider, BoxedBillingProvider};
pub use variant::{BillingInterval, Variant};
