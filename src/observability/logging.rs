//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for binaries
//! - Take the filter from `RUST_LOG`, else from the configured level
//!
//! # Design Decisions
//! - Logs go to stderr so command output on stdout stays machine readable
//! - Initialization is fallible instead of panicking when a subscriber is
//!   already installed

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Log levels accepted in `observability.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    format!("page_router={}", config.log_level)
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(config))))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
