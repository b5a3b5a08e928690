//! HIS/RIS REST API client
//!
//! [`ApiClient`] owns the transport, the shared [`SessionStore`] handle and
//! the refresh coordinator. Typed endpoint groups borrow it:
//!
//! ```no_run
//! # async fn demo(client: &hisris_infra::api::ApiClient) -> Result<(), hisris_infra::api::ApiError> {
//! client.auth().login("drhouse", "secret").await?;
//! let worklist = client.orders().worklist(None).await?;
//! println!("{} scheduled exams", worklist.len());
//! # Ok(()) }
//! ```
//!
//! # Architecture
//!
//! - All requests go through [`ApiClient::execute`]; a 401 is recovered at
//!   most once per request through `hisris_core::RefreshCoordinator`
//! - The refresh call uses the raw [`HttpClient`](crate::http::HttpClient),
//!   never `execute`
//! - No retries: 5xx and transport errors reach the caller unchanged
//!
//! [`SessionStore`]: hisris_core::SessionStore

pub mod admin;
pub mod auth;
pub mod client;
pub mod errors;
pub mod orders;
pub mod patients;
pub mod reports;
pub mod schedule;

pub use admin::AdminApi;
pub use auth::{AuthApi, HttpTokenRefresher};
pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig, RequestContext};
pub use errors::{ApiError, ApiErrorCategory};
pub use orders::OrdersApi;
pub use patients::PatientsApi;
pub use reports::ReportsApi;
pub use schedule::ScheduleApi;
