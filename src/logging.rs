//! # Structured Logging Module
//!
//! Environment-aware structured logging for debugging concurrent batch
//! execution. Human-readable output in development, JSON in production.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Safe to call more than once; only the first call has any effect. If a
/// global subscriber is already installed (e.g. by an embedding application),
/// the existing subscriber is left in place.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        if environment == "production" {
            let subscriber = tracing_subscriber::registry().with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_filter(EnvFilter::new(log_level)),
            );
            if subscriber.try_init().is_err() {
                tracing::debug!("Global tracing subscriber already initialized");
                return;
            }
        } else {
            let subscriber = tracing_subscriber::registry().with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true)
                    .with_filter(EnvFilter::new(log_level)),
            );
            if subscriber.try_init().is_err() {
                tracing::debug!("Global tracing subscriber already initialized");
                return;
            }
        }

        tracing::info!(
            environment = %environment,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
pub fn get_environment() -> String {
    std::env::var("TASKFLEET_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}
