//! # logscope-observability
//!
//! Logging initialisation and OpenTelemetry metrics for logscope.
//!
//! ## Built-in metrics
//! - `logscope.logs_decoded`: counter, tagged with event name
//! - `logscope.logs_unmatched`: counter
//! - `logscope.decode_errors`: counter, tagged with error kind
//! - `logscope.batch_size`: histogram
//!
//! ## Structured logging
//! Text or JSON output through `tracing-subscriber`, with a global level
//! and per-component overrides.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::DecodeMetrics;
pub use tracing_setup::{init_tracing, LogConfig};
