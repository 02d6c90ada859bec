//! Observability infrastructure for the Teams client.
//!
//! Provides tracing, metrics, and logging utilities.

pub mod logging;
pub mod metrics;
pub mod tracing_utils;

pub use logging::*;
pub use metrics::*;
pub use tracing_utils::*;
