//! Access token recovery
//!
//! A request that comes back `401 Unauthorized` on its first attempt is
//! handed to the [`refresh::RefreshCoordinator`], which performs at most one
//! refresh call at a time and parks every other 401 behind it.

pub mod attempt;
pub mod ports;
pub mod refresh;
