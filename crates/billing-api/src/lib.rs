//! # billing-api
//!
//! HTTP API layer for the Lemon Squeezy billing integration.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for checkout and variants
//! - Webhook handler for Lemon Squeezy events
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/checkout` | Create hosted checkout |
//! | GET | `/api/v1/variants/{variant_id}` | Get variant |
//! | POST | `/webhook/lemonsqueezy` | Lemon Squeezy webhook |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
