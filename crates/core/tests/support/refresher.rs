use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use hisris_core::{RefreshError, TokenRefresher};
use hisris_domain::TokenResponse;
use tokio::sync::Notify;

/// `TokenRefresher` that blocks inside `refresh` until the test releases it.
///
/// Lets a test hold the coordinator in `Refreshing` while it parks more
/// requests behind the in-flight call.
pub struct GatedRefresher {
    calls: AtomicUsize,
    seen_tokens: Mutex<Vec<String>>,
    entered: Notify,
    release: Notify,
    result: Result<TokenResponse, RefreshError>,
}

impl GatedRefresher {
    pub fn succeeding(access: &str, refresh: &str) -> Self {
        Self::with_result(Ok(TokenResponse {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            token_type: "bearer".to_string(),
            expires_in: 900,
        }))
    }

    pub fn failing(err: RefreshError) -> Self {
        Self::with_result(Err(err))
    }

    fn with_result(result: Result<TokenResponse, RefreshError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            seen_tokens: Mutex::new(Vec::new()),
            entered: Notify::new(),
            release: Notify::new(),
            result,
        }
    }

    /// Wait until a refresh call is in progress
    pub async fn wait_until_entered(&self) {
        self.entered.notified().await;
    }

    /// Let the in-flight refresh call return
    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenRefresher for GatedRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, RefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens.lock().unwrap().push(refresh_token.to_string());
        self.entered.notify_one();
        self.release.notified().await;
        self.result.clone()
    }
}
