//! Tower middleware for the courier transport.
//!
//! Layers installed with [`HyperClientBuilder::layer`](crate::HyperClientBuilder::layer)
//! wrap every transport call. A retried request goes through them once per
//! attempt, unlike response handlers which see each attempt's response.
//!
//! - [`LoggingLayer`] - logs each exchange using `tracing`

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
