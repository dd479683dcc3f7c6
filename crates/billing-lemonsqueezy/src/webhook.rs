//! # Lemon Squeezy Webhook Handling
//!
//! Signature verification, event parsing and dispatch for Lemon Squeezy
//! webhooks.
//!
//! The provider signs every delivery with a hex HMAC-SHA256 of the raw
//! request body, keyed by the webhook secret, sent as `X-Signature`.
//! Verification must run over the bytes exactly as received.

use billing_core::{BillingError, BillingResult, WebhookEvent, WebhookEventType};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use subtle::{Choice, ConstantTimeEq};
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "X-Signature";

// =============================================================================
// Signature Verification
// =============================================================================

/// Compute the lowercase hex HMAC-SHA256 of `payload` keyed by `secret`.
///
/// This is the value the provider sends in `X-Signature`.
pub fn sign_payload(secret: &str, payload: &[u8]) -> BillingResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BillingError::Configuration(format!("Invalid webhook secret: {}", e)))?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check `signature` against the expected digest of `payload`.
///
/// Absent, malformed and wrong signatures all yield the same
/// [`BillingError::SignatureMismatch`].
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> BillingResult<()> {
    if secret.is_empty() {
        return Err(BillingError::SignatureMismatch);
    }

    let expected = sign_payload(secret, payload).map_err(|_| BillingError::SignatureMismatch)?;

    if bool::from(signatures_match(&expected, signature)) {
        Ok(())
    } else {
        Err(BillingError::SignatureMismatch)
    }
}

/// Compare two hex signatures without branching on their content.
///
/// Slices of unequal length compare unequal without inspecting content.
fn signatures_match(expected: &str, provided: &str) -> Choice {
    expected.as_bytes().ct_eq(provided.as_bytes())
}

/// Parse a verified body into a [`WebhookEvent`].
///
/// The event name comes from `meta.event_name`, falling back to a top-level
/// `event_name` or `event` field.
pub fn parse_event(payload: &[u8]) -> BillingResult<WebhookEvent> {
    let value: serde_json::Value = serde_json::from_slice(payload)
        .map_err(|e| BillingError::MalformedPayload(format!("Invalid JSON: {}", e)))?;

    let root = value
        .as_object()
        .ok_or_else(|| BillingError::MalformedPayload("Payload is not a JSON object".to_string()))?;

    let meta = root.get("meta").and_then(|m| m.as_object());

    fn named(v: Option<&serde_json::Value>) -> Option<&str> {
        v.and_then(|v| v.as_str()).filter(|s| !s.is_empty())
    }

    let event_name = named(meta.and_then(|m| m.get("event_name")))
        .or_else(|| named(root.get("event_name")))
        .or_else(|| named(root.get("event")))
        .map(String::from)
        .ok_or_else(|| BillingError::MalformedPayload("Missing event name".to_string()))?;

    let data = root.get("data");

    let resource_type = data
        .and_then(|d| d.get("type"))
        .and_then(|v| v.as_str())
        .map(String::from);

    let resource_id = data
        .and_then(|d| d.get("id"))
        .or_else(|| root.get("id"))
        .and_then(value_as_id);

    let test_mode = meta
        .and_then(|m| m.get("test_mode"))
        .or_else(|| {
            data.and_then(|d| d.get("attributes"))
                .and_then(|a| a.get("test_mode"))
        })
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let custom_data: HashMap<String, serde_json::Value> = meta
        .and_then(|m| m.get("custom_data"))
        .and_then(|c| c.as_object())
        .map(|c| c.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    Ok(WebhookEvent {
        event_type: WebhookEventType::from_name(&event_name),
        event_name,
        resource_type,
        resource_id,
        test_mode,
        custom_data,
        payload: value,
    })
}

fn value_as_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// Event Data
// =============================================================================

/// Parsed `order_created` event data
#[derive(Debug, Clone)]
pub struct OrderCreatedData {
    pub order_id: String,
    pub identifier: Option<String>,
    pub order_number: Option<i64>,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    /// Total in minor units
    pub total: i64,
    pub currency: String,
    pub status: String,
    pub test_mode: bool,
    pub custom_data: HashMap<String, serde_json::Value>,
}

impl OrderCreatedData {
    /// Parse from a webhook event
    pub fn from_event(event: &WebhookEvent) -> BillingResult<Self> {
        let order_id = event
            .resource_id
            .clone()
            .ok_or_else(|| BillingError::MalformedPayload("Missing order id".to_string()))?;

        let str_attr = |name: &str| {
            event
                .attribute(name)
                .and_then(|v| v.as_str())
                .map(String::from)
        };

        Ok(Self {
            order_id,
            identifier: str_attr("identifier"),
            order_number: event.attribute("order_number").and_then(|v| v.as_i64()),
            customer_email: str_attr("user_email"),
            customer_name: str_attr("user_name"),
            total: event.attribute("total").and_then(|v| v.as_i64()).unwrap_or(0),
            currency: str_attr("currency").unwrap_or_else(|| "USD".to_string()),
            status: str_attr("status").unwrap_or_else(|| "unknown".to_string()),
            test_mode: event.test_mode,
            custom_data: event.custom_data.clone(),
        })
    }

    /// Check if the order was paid
    pub fn is_paid(&self) -> bool {
        self.status == "paid"
    }

    /// A string value passed as checkout metadata
    pub fn custom(&self, key: &str) -> Option<&str> {
        self.custom_data.get(key).and_then(|v| v.as_str())
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Webhook event handler trait
///
/// Implement this trait to handle different webhook events.
pub trait WebhookHandler: Send + Sync {
    /// Called when an order is placed
    fn on_order_created(&self, data: OrderCreatedData) -> BillingResult<()> {
        info!(
            "Order created: id={}, total={} {}",
            data.order_id, data.total, data.currency
        );
        Ok(())
    }

    fn on_order_refunded(&self, event: &WebhookEvent) -> BillingResult<()> {
        info!("Order refunded: {:?}", event.resource_id);
        Ok(())
    }

    fn on_subscription_created(&self, event: &WebhookEvent) -> BillingResult<()> {
        info!("Subscription created: {:?}", event.resource_id);
        Ok(())
    }

    fn on_subscription_updated(&self, event: &WebhookEvent) -> BillingResult<()> {
        debug!("Subscription updated: {:?}", event.resource_id);
        Ok(())
    }

    fn on_subscription_cancelled(&self, event: &WebhookEvent) -> BillingResult<()> {
        info!("Subscription cancelled: {:?}", event.resource_id);
        Ok(())
    }

    fn on_subscription_resumed(&self, event: &WebhookEvent) -> BillingResult<()> {
        info!("Subscription resumed: {:?}", event.resource_id);
        Ok(())
    }

    fn on_subscription_expired(&self, event: &WebhookEvent) -> BillingResult<()> {
        info!("Subscription expired: {:?}", event.resource_id);
        Ok(())
    }

    fn on_subscription_payment_success(&self, event: &WebhookEvent) -> BillingResult<()> {
        info!("Subscription payment succeeded: {:?}", event.resource_id);
        Ok(())
    }

    fn on_subscription_payment_failed(&self, event: &WebhookEvent) -> BillingResult<()> {
        warn!("Subscription payment failed: {:?}", event.resource_id);
        Ok(())
    }

    fn on_license_key_created(&self, event: &WebhookEvent) -> BillingResult<()> {
        info!("License key created: {:?}", event.resource_id);
        Ok(())
    }

    /// Called for events without a dedicated method
    fn on_other_event(&self, event: &WebhookEvent) -> BillingResult<()> {
        debug!("Unhandled webhook event: {}", event.event_name);
        Ok(())
    }
}

/// Default webhook handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: WebhookEvent,
) -> BillingResult<()> {
    match &event.event_type {
        WebhookEventType::OrderCreated => {
            let data = OrderCreatedData::from_event(&event)?;
            handler.on_order_created(data)
        }
        WebhookEventType::OrderRefunded => handler.on_order_refunded(&event),
        WebhookEventType::SubscriptionCreated => handler.on_subscription_created(&event),
        WebhookEventType::SubscriptionUpdated => handler.on_subscription_updated(&event),
        WebhookEventType::SubscriptionCancelled => handler.on_subscription_cancelled(&event),
        WebhookEventType::SubscriptionResumed => handler.on_subscription_resumed(&event),
        WebhookEventType::SubscriptionExpired => handler.on_subscription_expired(&event),
        WebhookEventType::SubscriptionPaymentSuccess => {
            handler.on_subscription_payment_success(&event)
        }
        WebhookEventType::SubscriptionPaymentFailed => {
            handler.on_subscription_payment_failed(&event)
        }
        WebhookEventType::LicenseKeyCreated => handler.on_license_key_created(&event),
        _ => handler.on_other_event(&event),
    }
}

/// Events that should be enabled in the Lemon Squeezy dashboard
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "order_created",
    "order_refunded",
    "subscription_created",
    "subscription_updated",
    "subscription_cancelled",
    "subscription_resumed",
    "subscription_expired",
    "subscription_payment_success",
    "subscription_payment_failed",
];
