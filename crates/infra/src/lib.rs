//! # HIS/RIS Infrastructure
//!
//! HTTP and filesystem implementations around `hisris-core`.
//!
//! This crate contains:
//! - The REST API client with transparent token refresh
//! - Typed endpoint groups (auth, admin, patients, orders, reports, schedule)
//! - Configuration loading from environment and files
//! - Session persistence to disk
//! - Tracing setup and client counters
//!
//! ## Architecture
//! - Implements the `TokenRefresher` port from `hisris-core`
//! - Depends on `hisris-domain` and `hisris-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod session;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientConfig, ApiError, ApiErrorCategory};
pub use bootstrap::{connect, ClientHandle};
pub use errors::InfraError;
pub use http::HttpClient;
pub use observability::{init_tracing, ClientMetrics, ClientMetricsSnapshot};
pub use session::{restore_session, spawn_session_persistence, FileSessionStorage};
