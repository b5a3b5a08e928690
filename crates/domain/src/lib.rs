//! # HIS/RIS Domain
//!
//! Wire types and domain models for the HIS/RIS REST API.
//!
//! This crate contains:
//! - Auth, patient, order, report and schedule payloads
//! - Domain error types and Result definitions
//! - Client configuration structures
//! - API path constants
//!
//! ## Architecture
//! - No dependencies on other HIS/RIS crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
