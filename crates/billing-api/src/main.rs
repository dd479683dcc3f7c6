//! # Lemon Billing
//!
//! Hosted-checkout billing service backed by Lemon Squeezy.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export LEMONSQUEEZY_API_KEY=...
//! export LEMONSQUEEZY_STORE_ID=12345
//! export LEMONSQUEEZY_WEBHOOK_SECRET=...
//! export LEMONSQUEEZY_DEFAULT_VARIANT_ID=67890
//!
//! # Run the server
//! lemon-billing
//! ```

use billing_api::{routes, state::AppState};
use billing_lemonsqueezy::REQUIRED_WEBHOOK_EVENTS;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    // Fails fast on missing LEMONSQUEEZY_* settings
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.provider.provider_name());

    let webhook_path = state.provider.webhook_path();
    let app = routes::create_router(state);

    info!("Lemon Billing {} starting on http://{}", env!("CARGO_PKG_VERSION"), addr);

    if !is_prod {
        info!("Checkout: POST http://{}/api/v1/checkout", addr);
        info!("Webhook: POST http://{}{}", addr, webhook_path);
        info!("Webhook events to enable: {}", REQUIRED_WEBHOOK_EVENTS.join(", "));
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` controls filtering; `LOG_FORMAT=json` switches to JSON lines.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}
