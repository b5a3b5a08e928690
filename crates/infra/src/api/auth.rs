//! Authentication endpoints
//!
//! [`HttpTokenRefresher`] is the coordinator's view of `POST /auth/refresh`;
//! it talks to the raw transport so a rejected refresh can never re-enter the
//! 401 handling it serves. [`AuthApi`] covers login, profile and logout.

use async_trait::async_trait;
use hisris_core::{RefreshError, TokenRefresher};
use hisris_domain::constants::{
    AUTH_LOGIN_PATH, AUTH_LOGOUT_PATH, AUTH_ME_PATH, AUTH_REFRESH_PATH,
};
use hisris_domain::{LoginRequest, RefreshRequest, TokenResponse, UserProfile};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::client::{endpoint_url, ensure_success, ApiClient, RequestContext};
use super::errors::ApiError;
use crate::http::HttpClient;

/// Calls the refresh endpoint without a bearer token or 401 interception
#[derive(Debug, Clone)]
pub struct HttpTokenRefresher {
    http: HttpClient,
    url: Url,
}

impl HttpTokenRefresher {
    /// # Errors
    ///
    /// Returns `ApiError::Config` if `base_url` cannot be joined with the
    /// refresh path.
    pub fn new(http: HttpClient, base_url: &str) -> Result<Self, ApiError> {
        Ok(Self { http, url: endpoint_url(base_url, AUTH_REFRESH_PATH)? })
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, RefreshError> {
        let body = RefreshRequest { refresh_token: refresh_token.to_string() };
        let request = self.http.request(Method::POST, self.url.clone()).json(&body);

        let response = self
            .http
            .send(request)
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(%status, "refresh endpoint rejected the refresh token");
            return Err(RefreshError::Rejected { status: status.as_u16(), message });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))
    }
}

/// Login, profile and logout
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }
}

impl AuthApi<'_> {
    /// Sign in and populate the session with tokens and profile.
    ///
    /// The session is left empty if either the login or the profile fetch
    /// fails.
    ///
    /// # Errors
    ///
    /// `ApiError::Unauthorized` for bad credentials; any error from
    /// `/auth/me`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, ApiError> {
        let body = LoginRequest { username: username.to_string(), password: password.to_string() };
        let ctx = RequestContext::new(Method::POST, self.client.endpoint(AUTH_LOGIN_PATH)?)
            .with_body(json_body(&body)?)
            .anonymous();
        let tokens: TokenResponse = self.client.execute_json(ctx).await?;

        let session = self.client.session();
        session.set_tokens(tokens.access_token, tokens.refresh_token);

        match self.me().await {
            Ok(user) => {
                session.set_user(user.clone());
                info!(user_id = user.id, role = %user.role, "logged in");
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "profile fetch after login failed, clearing session");
                session.logout();
                Err(err)
            }
        }
    }

    /// Exchange a refresh token for a new token pair without touching the
    /// session.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        let body = RefreshRequest { refresh_token: refresh_token.to_string() };
        let ctx = RequestContext::new(Method::POST, self.client.endpoint(AUTH_REFRESH_PATH)?)
            .with_body(json_body(&body)?)
            .anonymous();
        self.client.execute_json(ctx).await
    }

    /// Current user's profile
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.client.get(AUTH_ME_PATH).await
    }

    /// Sign out.
    ///
    /// The server is told on a best-effort basis; its failure is logged and
    /// ignored. The local session is always cleared.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let session = self.client.session();

        if session.is_authenticated() {
            if let Err(err) = self.notify_logout().await {
                warn!(error = %err, "server-side logout failed, clearing local session anyway");
            }
        }

        session.logout();
        info!("logged out");
    }

    async fn notify_logout(&self) -> Result<(), ApiError> {
        let url = self.client.endpoint(AUTH_LOGOUT_PATH)?;
        let ctx = RequestContext::new(Method::POST, url).without_recovery();
        let response = self.client.execute(ctx).await?;
        ensure_success(response, AUTH_LOGOUT_PATH).await.map(drop)
    }
}

fn json_body<B: serde::Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::Config(format!("Failed to serialize request body: {e}")))
}
