//! # Structured Logging Module
//!
//! Environment-aware structured logging for debugging transition flows and
//! reconciler sweeps. The embedding application owns log files; this core
//! only installs a console subscriber when nothing else has.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(EnvFilter::new(log_level)),
        );

        // Use try_init to avoid a panic if the embedding app already set a
        // global subscriber.
        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(environment = %environment, "Structured logging initialized");
    });
}

fn get_environment() -> String {
    std::env::var("SHOPFLOOR_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn get_log_level(environment: &str) -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| match environment {
        "production" => "shopfloor_core=info".to_string(),
        "test" => "shopfloor_core=warn".to_string(),
        _ => "shopfloor_core=debug".to_string(),
    })
}
