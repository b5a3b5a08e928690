//! Session state
//!
//! Holds the access/refresh token pair and the current user. The store is
//! passed by handle to everything that needs it; nothing else mutates
//! tokens.

pub mod store;

pub use store::{Session, SessionStore};
