//! # Lemon Squeezy Client
//!
//! Authenticated JSON:API calls for hosted checkouts and variant lookup,
//! plus webhook verification.

use crate::config::LemonSqueezyConfig;
use crate::jsonapi::{
    CheckoutAttributes, CheckoutData, CheckoutDocument, CheckoutRelationships, CheckoutResource,
    CheckoutResponseAttributes, Document, ErrorDocument, ProductOptions, Relationship,
    VariantAttributes, CONTENT_TYPE,
};
use crate::webhook;
use async_trait::async_trait;
use billing_core::{
    BillingError, BillingProvider, BillingResult, CheckoutRequest, CheckoutSession, Variant,
    WebhookEvent,
};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE as CONTENT_TYPE_HEADER,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

/// Lemon Squeezy API client
///
/// Holds only immutable configuration and a pooled HTTP client, so it can be
/// shared freely across tasks.
pub struct LemonSqueezyClient {
    config: LemonSqueezyConfig,
    client: Client,
}

impl LemonSqueezyClient {
    /// Create a new client from validated configuration
    pub fn new(config: LemonSqueezyConfig) -> BillingResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(CONTENT_TYPE));
        headers.insert(CONTENT_TYPE_HEADER, HeaderValue::from_static(CONTENT_TYPE));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                BillingError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> BillingResult<Self> {
        let config = LemonSqueezyConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &LemonSqueezyConfig {
        &self.config
    }

    /// Create a hosted checkout.
    ///
    /// Fails with `Configuration` before any request if no variant can be
    /// resolved.
    #[instrument(skip(self, request))]
    pub async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> BillingResult<CheckoutSession> {
        let variant_id = request
            .resolve_variant(self.config.default_variant_id.as_deref())
            .ok_or_else(|| {
                BillingError::Configuration(
                    "Variant ID must be supplied for checkout \
                     (no LEMONSQUEEZY_DEFAULT_VARIANT_ID set)"
                        .to_string(),
                )
            })?;

        let document = CheckoutDocument {
            data: CheckoutResource {
                kind: "checkouts",
                attributes: CheckoutAttributes {
                    checkout_data: CheckoutData {
                        email: request.customer_email.as_deref(),
                        custom: (!request.metadata.is_empty()).then_some(&request.metadata),
                    },
                    product_options: ProductOptions {
                        redirect_url: request
                            .success_url
                            .as_deref()
                            .unwrap_or(&self.config.success_url),
                        cancel_url: request
                            .cancel_url
                            .as_deref()
                            .unwrap_or(&self.config.cancel_url),
                    },
                    custom_price: request.custom_price_cents,
                    test_mode: request.test_mode,
                },
                relationships: CheckoutRelationships {
                    store: Relationship::to("stores", &self.config.store_id),
                    variant: Relationship::to("variants", variant_id),
                },
            },
        };

        let body = serde_json::to_vec(&document).map_err(|e| {
            BillingError::InvalidRequest(format!("Failed to encode checkout request: {}", e))
        })?;

        debug!(
            "Creating Lemon Squeezy checkout: variant={}, metadata_keys={}",
            variant_id,
            request.metadata.len()
        );

        let url = self.config.endpoint("/checkouts");
        let doc: Document<CheckoutResponseAttributes> =
            self.send(self.client.post(&url).body(body), None).await?;

        let session = doc.data.into_session();
        info!(
            "Created Lemon Squeezy checkout: id={}, url={}",
            session.id, session.checkout_url
        );

        Ok(session)
    }

    /// Fetch a variant by ID.
    ///
    /// The ID is used as given: surrounding whitespace is not trimmed and
    /// fails validation like any other character outside `[A-Za-z0-9_-]`.
    #[instrument(skip(self))]
    pub async fn get_variant(&self, variant_id: &str) -> BillingResult<Variant> {
        if variant_id.is_empty() {
            return Err(BillingError::InvalidRequest("variant_id is required".to_string()));
        }
        if !variant_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(BillingError::InvalidRequest(format!(
                "Invalid variant_id: {}",
                variant_id
            )));
        }

        let url = self.config.endpoint(&format!("/variants/{}", variant_id));
        let resource = format!("variant {}", variant_id);
        let doc: Document<VariantAttributes> =
            self.send(self.client.get(&url), Some(&resource)).await?;

        let variant = doc.data.into_variant();
        debug!("Fetched variant: id={}, price={}", variant.id, variant.price);

        Ok(variant)
    }

    /// Verify a webhook delivery and parse its event.
    ///
    /// `payload` must be the raw request body, never a re-serialized form.
    #[instrument(skip(self, payload, signature), fields(bytes = payload.len()))]
    pub fn verify_webhook(&self, payload: &[u8], signature: &str) -> BillingResult<WebhookEvent> {
        webhook::verify_signature(&self.config.webhook_secret, payload, signature)?;

        let event = webhook::parse_event(payload)?;
        debug!("Verified Lemon Squeezy webhook: event={}", event.event_name);

        Ok(event)
    }

    /// Send an authenticated request once and decode a 2xx body.
    ///
    /// `resource` names what a lookup addresses; only lookups turn a 404
    /// into `NotFound`.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: Option<&str>,
    ) -> BillingResult<T> {
        let response = request
            .header(AUTHORIZATION, self.config.auth_header())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            error!("Lemon Squeezy API error: status={}, body={}", status, body);
            return Err(status_error(status, &body, resource));
        }

        serde_json::from_str(&body).map_err(|e| {
            BillingError::ProviderUnavailable(format!(
                "Failed to parse Lemon Squeezy response: {}",
                e
            ))
        })
    }
}

fn transport_error(e: reqwest::Error) -> BillingError {
    if e.is_timeout() {
        BillingError::ProviderUnavailable(format!("Request timed out: {}", e))
    } else {
        BillingError::ProviderUnavailable(e.to_string())
    }
}

/// Map a non-2xx response onto the error taxonomy.
///
/// Without a `resource`, a 404 is a rejected request like any other 4xx.
fn status_error(status: StatusCode, body: &str, resource: Option<&str>) -> BillingError {
    let detail = serde_json::from_str::<ErrorDocument>(body)
        .ok()
        .and_then(|doc| doc.summary())
        .unwrap_or_else(|| format!("HTTP {}", status));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BillingError::Authentication(detail),
        StatusCode::NOT_FOUND => match resource {
            Some(resource) => BillingError::NotFound(format!("{}: {}", resource, detail)),
            None => BillingError::InvalidRequest(detail),
        },
        s if s.is_client_error() => BillingError::InvalidRequest(detail),
        _ => BillingError::ProviderUnavailable(detail),
    }
}

#[async_trait]
impl BillingProvider for LemonSqueezyClient {
    async fn create_checkout(&self, request: &CheckoutRequest) -> BillingResult<CheckoutSession> {
        LemonSqueezyClient::create_checkout(self, request).await
    }

    async fn get_variant(&self, variant_id: &str) -> BillingResult<Variant> {
        LemonSqueezyClient::get_variant(self, variant_id).await
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> BillingResult<WebhookEvent> {
        LemonSqueezyClient::verify_webhook(self, payload, signature)
    }

    fn provider_name(&self) -> &'static str {
        "lemonsqueezy"
    }
}
