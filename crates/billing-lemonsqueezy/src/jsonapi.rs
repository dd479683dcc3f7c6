//! # JSON:API Wire Types
//!
//! Request and response documents for the Lemon Squeezy API.

use billing_core::{BillingInterval, CheckoutSession, Variant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

pub const CONTENT_TYPE: &str = "application/vnd.api+json";

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct CheckoutDocument<'a> {
    pub data: CheckoutResource<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckoutResource<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: CheckoutAttributes<'a>,
    pub relationships: CheckoutRelationships<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckoutAttributes<'a> {
    pub checkout_data: CheckoutData<'a>,
    pub product_options: ProductOptions<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_mode: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckoutData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<&'a HashMap<String, String>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProductOptions<'a> {
    pub redirect_url: &'a str,
    pub cancel_url: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckoutRelationships<'a> {
    pub store: Relationship<'a>,
    pub variant: Relationship<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Relationship<'a> {
    pub data: ResourceIdentifier<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResourceIdentifier<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: &'a str,
}

impl<'a> Relationship<'a> {
    pub fn to(kind: &'static str, id: &'a str) -> Self {
        Self {
            data: ResourceIdentifier { kind, id },
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct Document<T> {
    pub data: Resource<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Resource<T> {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub attributes: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckoutResponseAttributes {
    pub url: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Resource<CheckoutResponseAttributes> {
    pub fn into_session(self) -> CheckoutSession {
        let attrs = self.attributes;
        CheckoutSession {
            id: self.id,
            checkout_url: attrs.url,
            variant_id: attrs.variant_id,
            test_mode: attrs.test_mode,
            expires_at: attrs.expires_at,
            created_at: attrs.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariantAttributes {
    #[serde(deserialize_with = "id_string")]
    pub product_id: String,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_subscription: bool,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub interval_count: Option<u32>,
}

impl Resource<VariantAttributes> {
    pub fn into_variant(self) -> Variant {
        let attrs = self.attributes;
        Variant {
            id: self.id,
            product_id: attrs.product_id,
            name: attrs.name,
            price: attrs.price,
            description: attrs.description.filter(|d| !d.is_empty()),
            status: attrs.status,
            is_subscription: attrs.is_subscription,
            interval: attrs.interval.as_deref().and_then(BillingInterval::parse),
            interval_count: attrs.interval_count,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorDocument {
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<ErrorSource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorSource {
    #[serde(default)]
    pub pointer: Option<String>,
}

impl ErrorDocument {
    /// Flatten error details into one line, or `None` if there are none
    pub fn summary(&self) -> Option<String> {
        let parts: Vec<String> = self
            .errors
            .iter()
            .filter_map(|e| {
                let text = e.detail.as_deref().or(e.title.as_deref())?;
                Some(match e.source.as_ref().and_then(|s| s.pointer.as_deref()) {
                    Some(pointer) => format!("{} ({})", text, pointer),
                    None => text.to_string(),
                })
            })
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

// The API sends ids as strings at the top level and as numbers inside
// attributes.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}
