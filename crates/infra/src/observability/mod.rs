//! Observability: tracing subscriber setup and client counters
//!
//! Logging goes through `tracing` everywhere. Binaries call
//! [`init_tracing`] once at startup; libraries and tests never install a
//! subscriber themselves.
//!
//! Access and refresh tokens are never recorded in spans or events.

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
pub use metrics::{ClientMetrics, ClientMetricsSnapshot};
