//! Shared fixtures for core integration tests

pub mod refresher;

pub use refresher::GatedRefresher;
