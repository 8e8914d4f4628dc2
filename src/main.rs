//! Payment Gateway - checkout sessions, payment intents and Stripe webhooks
//!
//! This is the main entry point for the gateway service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payment_gateway::adapters::http::{app_router, GatewaySettings, PaymentsAppState};
use payment_gateway::adapters::rate_limiter::InMemoryRateLimiter;
use payment_gateway::adapters::security::TracingSecurityEventSink;
use payment_gateway::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use payment_gateway::application::handlers::webhook::{
    default_event_dispatcher, ProcessWebhookHandler,
};
use payment_gateway::config::AppConfig;
use payment_gateway::domain::webhook::WebhookVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    // Initialize tracing
    let json_logs = config.is_production();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.clone().into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting Payment Gateway");

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    tracing::info!(
        environment = ?config.server.environment,
        app_url = %config.server.app_url,
        stripe_live_mode = config.payment.is_live_mode(),
        webhook_secret_configured = config.payment.has_webhook_secret(),
        "Service configuration loaded"
    );
    if !config.payment.has_webhook_secret() {
        tracing::warn!("Stripe webhook secret not configured; webhook deliveries will be rejected");
    }

    // Stripe client
    let stripe_config = StripeConfig::new(config.payment.secret_key())
        .with_base_url(config.payment.api_base_url.clone())
        .with_timeout(Duration::from_secs(config.payment.request_timeout_secs))
        .with_max_network_retries(config.payment.max_network_retries);
    let payment_provider = Arc::new(StripePaymentAdapter::new(stripe_config)?);

    // Webhook verification and dispatch
    let webhook_secret = config
        .payment
        .webhook_secret()
        .map(|secret| secret.expose_secret().clone())
        .unwrap_or_default();
    let verifier = WebhookVerifier::new(webhook_secret)
        .with_tolerance_secs(config.payment.webhook_tolerance_secs)
        .with_max_payload_bytes(config.limits.webhook_max_body_bytes);
    let webhook_handler = Arc::new(ProcessWebhookHandler::new(
        verifier,
        default_event_dispatcher(),
    ));

    let state = PaymentsAppState {
        payment_provider,
        rate_limiter: Arc::new(InMemoryRateLimiter::new()),
        security_sink: Arc::new(TracingSecurityEventSink::new()),
        webhook_handler,
        settings: GatewaySettings::from_config(&config),
    };

    let app = app_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );
    tracing::info!(
        guards_enforced = config.is_production(),
        "Router configured with payment endpoints"
    );

    // Start HTTP server
    let listen_addr = config.server.socket_addr()?;
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
