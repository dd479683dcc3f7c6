//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the billing provider and service configuration.

use billing_core::BoxedBillingProvider;
use billing_lemonsqueezy::{LemonSqueezyClient, LoggingWebhookHandler, WebhookHandler};
use std::net::SocketAddr;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e)
            })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Billing provider
    pub provider: BoxedBillingProvider,
    /// Receives verified webhook events
    pub webhook_handler: Arc<dyn WebhookHandler>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state backed by Lemon Squeezy, configured from the environment.
    ///
    /// Missing provider settings are fatal here, before the server binds.
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let client = LemonSqueezyClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Lemon Squeezy: {}", e))?;

        Ok(Self::with_provider(Arc::new(client), config))
    }

    /// Create state around an existing provider (for testing)
    pub fn with_provider(provider: BoxedBillingProvider, config: AppConfig) -> Self {
        Self {
            provider,
            webhook_handler: Arc::new(LoggingWebhookHandler),
            config,
        }
    }

    /// Builder: replace the webhook event handler
    pub fn with_webhook_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.webhook_handler = handler;
        self
    }
}
