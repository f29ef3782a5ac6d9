//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router operations produce:
//!     → tracing events (candidate decisions, failures)
//!     → metrics.rs (match / generate counters)
//!
//! Binaries consume:
//!     → logging.rs (subscriber on stderr, filter from RUST_LOG or config)
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers and recorders is left
//!   to the binary
//! - Structured fields instead of interpolated messages

pub mod logging;
pub mod metrics;
