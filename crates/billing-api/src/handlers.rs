//! # Request Handlers
//!
//! Axum request handlers for the billing API.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use billing_core::{BillingError, CheckoutRequest, CheckoutSession, Variant};
use billing_lemonsqueezy::{dispatch_webhook_event, SIGNATURE_HEADER};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

/// Checkout body accepted from API callers
///
/// Price overrides, test mode and redirect targets are not caller input;
/// they stay with the server configuration. Other fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CreateCheckoutBody {
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub customer_email: Option<String>,
}

impl From<CreateCheckoutBody> for CheckoutRequest {
    fn from(body: CreateCheckoutBody) -> Self {
        CheckoutRequest {
            variant_id: body.variant_id,
            metadata: body.metadata,
            customer_email: body.customer_email,
            ..CheckoutRequest::default()
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn billing_error_to_response(err: BillingError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "lemon-billing",
        "provider": state.provider.provider_name(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a hosted checkout
#[instrument(skip(state, body), fields(variant = ?body.variant_id))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(body): Json<CreateCheckoutBody>,
) -> Result<Json<CheckoutSession>, ApiError> {
    let request = CheckoutRequest::from(body);
    let session = state.provider.create_checkout(&request).await.map_err(|e| {
        error!("Failed to create checkout: {}", e);
        billing_error_to_response(e)
    })?;

    info!("Created checkout session: {}", session.id);

    Ok(Json(session))
}

/// Get a single variant
#[instrument(skip(state))]
pub async fn get_variant(
    State(state): State<AppState>,
    Path(variant_id): Path<String>,
) -> Result<Json<Variant>, ApiError> {
    let variant = state
        .provider
        .get_variant(&variant_id)
        .await
        .map_err(billing_error_to_response)?;

    Ok(Json(variant))
}

/// Handle Lemon Squeezy webhook
///
/// The body is taken as raw bytes so the signature is checked against
/// exactly what was sent.
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn lemonsqueezy_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    // A missing header is rejected the same way as a wrong one.
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let event = state
        .provider
        .verify_webhook(&body, signature)
        .map_err(|e| {
            warn!("Webhook rejected: {}", e);
            billing_error_to_response(e)
        })?;

    info!(
        "Received webhook: event={}, resource={:?}, test_mode={}",
        event.event_name, event.resource_id, event.test_mode
    );

    dispatch_webhook_event(state.webhook_handler.as_ref(), event).map_err(|e| {
        error!("Webhook handler error: {}", e);
        billing_error_to_response(e)
    })?;

    Ok(StatusCode::OK)
}
