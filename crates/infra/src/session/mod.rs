//! Session persistence
//!
//! Keeps the session across restarts: a JSON file on disk, a background task
//! mirroring every store change into it, and a restore step at startup.

pub mod persistence;

pub use persistence::{restore_session, spawn_session_persistence, FileSessionStorage};
