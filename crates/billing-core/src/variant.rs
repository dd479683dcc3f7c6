//! # Variant Types
//!
//! Purchasable variants as reported by the provider catalog.
//! Fetched on demand and never cached here.

use serde::{Deserialize, Serialize};

/// Renewal interval for subscription variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Day,
    Week,
    Month,
    Year,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Day => "day",
            BillingInterval::Week => "week",
            BillingInterval::Month => "month",
            BillingInterval::Year => "year",
        }
    }

    /// Parse the provider's interval name
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "day" => Some(BillingInterval::Day),
            "week" => Some(BillingInterval::Week),
            "month" => Some(BillingInterval::Month),
            "year" => Some(BillingInterval::Year),
            _ => None,
        }
    }
}

/// A purchasable SKU or plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant ID
    pub id: String,

    /// Parent product ID
    pub product_id: String,

    /// Display name
    pub name: String,

    /// Price in minor units (cents)
    pub price: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Publication status (`published`, `pending`, `draft`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default)]
    pub is_subscription: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<BillingInterval>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_count: Option<u32>,
}

impl Variant {
    /// Format price for display (e.g., "9.99")
    pub fn display_price(&self) -> String {
        let sign = if self.price < 0 { "-" } else { "" };
        let abs = self.price.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }

    /// Whether the variant can currently be sold
    pub fn is_published(&self) -> bool {
        self.status.as_deref().map_or(true, |s| s == "published")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(price: i64) -> Variant {
        Variant {
            id: "1".to_string(),
            product_id: "10".to_string(),
            name: "Pro".to_string(),
            price,
            description: None,
            status: Some("published".to_string()),
            is_subscription: true,
            interval: Some(BillingInterval::Month),
            interval_count: Some(1),
        }
    }

    #[test]
    fn test_display_price() {
        assert_eq!(variant(999).display_price(), "9.99");
        assert_eq!(variant(5).display_price(), "0.05");
        assert_eq!(variant(120000).display_price(), "1200.00");
    }

    #[test]
    fn test_interval_parse() {
        assert_eq!(BillingInterval::parse("month"), Some(BillingInterval::Month));
        assert_eq!(BillingInterval::parse("YEAR"), Some(BillingInterval::Year));
        assert_eq!(BillingInterval::parse("fortnight"), None);
    }

    #[test]
    fn test_is_published() {
        let mut v = variant(100);
        assert!(v.is_published());
        v.status = Some("draft".to_string());
        assert!(!v.is_published());
    }
}
