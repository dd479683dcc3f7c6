//! # Webhook Event Types
//!
//! Events are only ever built from a webhook body whose signature has
//! already been verified.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Webhook event types we care about
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    OrderCreated,
    OrderRefunded,
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionCancelled,
    SubscriptionResumed,
    SubscriptionExpired,
    SubscriptionPaused,
    SubscriptionUnpaused,
    SubscriptionPaymentSuccess,
    SubscriptionPaymentFailed,
    SubscriptionPaymentRecovered,
    SubscriptionPaymentRefunded,
    LicenseKeyCreated,
    LicenseKeyUpdated,
    /// Unknown event (passthrough)
    Unknown(String),
}

impl WebhookEventType {
    /// Map a provider event name to its type
    pub fn from_name(name: &str) -> Self {
        match name {
            "order_created" => WebhookEventType::OrderCreated,
            "order_refunded" => WebhookEventType::OrderRefunded,
            "subscription_created" => WebhookEventType::SubscriptionCreated,
            "subscription_updated" => WebhookEventType::SubscriptionUpdated,
            "subscription_cancelled" => WebhookEventType::SubscriptionCancelled,
            "subscription_resumed" => WebhookEventType::SubscriptionResumed,
            "subscription_expired" => WebhookEventType::SubscriptionExpired,
            "subscription_paused" => WebhookEventType::SubscriptionPaused,
            "subscription_unpaused" => WebhookEventType::SubscriptionUnpaused,
            "subscription_payment_success" => WebhookEventType::SubscriptionPaymentSuccess,
            "subscription_payment_failed" => WebhookEventType::SubscriptionPaymentFailed,
            "subscription_payment_recovered" => WebhookEventType::SubscriptionPaymentRecovered,
            "subscription_payment_refunded" => WebhookEventType::SubscriptionPaymentRefunded,
            "license_key_created" => WebhookEventType::LicenseKeyCreated,
            "license_key_updated" => WebhookEventType::LicenseKeyUpdated,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::OrderCreated => "order_created",
            WebhookEventType::OrderRefunded => "order_refunded",
            WebhookEventType::SubscriptionCreated => "subscription_created",
            WebhookEventType::SubscriptionUpdated => "subscription_updated",
            WebhookEventType::SubscriptionCancelled => "subscription_cancelled",
            WebhookEventType::SubscriptionResumed => "subscription_resumed",
            WebhookEventType::SubscriptionExpired => "subscription_expired",
            WebhookEventType::SubscriptionPaused => "subscription_paused",
            WebhookEventType::SubscriptionUnpaused => "subscription_unpaused",
            WebhookEventType::SubscriptionPaymentSuccess => "subscription_payment_success",
            WebhookEventType::SubscriptionPaymentFailed => "subscription_payment_failed",
            WebhookEventType::SubscriptionPaymentRecovered => "subscription_payment_recovered",
            WebhookEventType::SubscriptionPaymentRefunded => "subscription_payment_refunded",
            WebhookEventType::LicenseKeyCreated => "license_key_created",
            WebhookEventType::LicenseKeyUpdated => "license_key_updated",
            WebhookEventType::Unknown(name) => name,
        }
    }

    /// Subscription lifecycle and subscription payment events
    pub fn is_subscription_event(&self) -> bool {
        self.as_str().starts_with("subscription_")
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified, parsed webhook event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event name as sent by the provider
    pub event_name: String,

    pub event_type: WebhookEventType,

    /// Resource kind the event is about (`orders`, `subscriptions`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    #[serde(default)]
    pub test_mode: bool,

    /// Metadata passed at checkout creation
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom_data: HashMap<String, serde_json::Value>,

    /// The full JSON body
    pub payload: serde_json::Value,
}

impl WebhookEvent {
    /// Resource attributes (`data.attributes`), if present
    pub fn attributes(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.payload
            .get("data")
            .and_then(|d| d.get("attributes"))
            .and_then(|a| a.as_object())
    }

    /// A single resource attribute
    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes().and_then(|a| a.get(name))
    }

    /// A string value from `custom_data`
    pub fn custom_str(&self, key: &str) -> Option<&str> {
        self.custom_data.get(key).and_then(|v| v.as_str())
    }
}
