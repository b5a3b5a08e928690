//! Port interfaces for token refresh
//!
//! The coordinator never talks HTTP itself; infrastructure provides the
//! call to `POST /auth/refresh`.

use async_trait::async_trait;
use hisris_domain::TokenResponse;

use super::refresh::RefreshError;

/// Exchanges a refresh token for a new token pair
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Call the refresh endpoint.
    ///
    /// Implementations must not route this call through the 401 recovery
    /// path, otherwise a rejected refresh would recurse into itself.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, RefreshError>;
}
