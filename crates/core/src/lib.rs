//! # HIS/RIS Core
//!
//! Pure session and authentication logic - no HTTP dependencies.
//!
//! This crate contains:
//! - The session store (single source of truth for tokens and user)
//! - The token refresh coordinator (401 recovery state machine)
//! - Port interfaces implemented by `hisris-infra`
//!
//! ## Architecture Principles
//! - Only depends on `hisris-domain`
//! - No HTTP or filesystem code
//! - The refresh endpoint is reached through the [`TokenRefresher`] port
//! - Locks are never held across an `.await`

pub mod auth;
pub mod session;

pub use auth::attempt::Attempt;
pub use auth::ports::TokenRefresher;
pub use auth::refresh::{RefreshCoordinator, RefreshError, RefreshPhase, RefreshStats};
pub use session::{Session, SessionStore};
