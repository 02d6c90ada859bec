//! Resilience patterns for the Teams client.
//!
//! Provides the bounded-retry request executor shared by every service.

pub mod executor;

pub use executor::{execute, AttemptConfig, RequestExecutor};
