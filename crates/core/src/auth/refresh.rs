//! Token refresh coordinator
//!
//! State machine for recovering from an expired access token:
//!
//! | State        | Event                         | Action                              |
//! |--------------|-------------------------------|-------------------------------------|
//! | `Normal`     | first 401 of a request        | become leader, call refresh         |
//! | `Refreshing` | first 401 of another request  | park a waiter, no second refresh    |
//! | `Refreshing` | refresh succeeded             | store tokens, wake waiters with token |
//! | `Refreshing` | refresh failed / no token     | clear session, wake waiters with error |
//!
//! The `refreshing` flag is read and set inside one critical section, and
//! that lock is never held across an `.await`, so two concurrent 401s can
//! never both start a refresh.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::ports::TokenRefresher;
use crate::session::SessionStore;

/// Why a token refresh did not produce a new access token.
///
/// Cloned to every request parked behind the failed refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("no refresh token available")]
    MissingRefreshToken,

    #[error("refresh rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("refresh transport error: {0}")]
    Transport(String),

    #[error("invalid refresh response: {0}")]
    InvalidResponse(String),

    #[error("refresh abandoned before completion")]
    Abandoned,
}

/// Observable phase of the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Normal,
    Refreshing,
}

/// Counters describing refresh activity since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    /// Calls made to the refresh endpoint
    pub refreshes_started: u64,
    pub refreshes_succeeded: u64,
    /// Failed refresh calls plus 401s that found no refresh token
    pub refreshes_failed: u64,
    /// Requests that waited on someone else's refresh
    pub waiters_queued: u64,
}

type RefreshOutcome = Result<String, RefreshError>;

/// A request parked until the in-flight refresh settles
struct Waiter {
    tx: oneshot::Sender<RefreshOutcome>,
}

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: VecDeque<Waiter>,
}

enum Role {
    Leader,
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

#[derive(Default)]
struct Counters {
    started: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    queued: AtomicU64,
}

/// Serializes token refreshes and fans their outcome out to every waiter
pub struct RefreshCoordinator {
    session: Arc<SessionStore>,
    refresher: Arc<dyn TokenRefresher>,
    state: Mutex<RefreshState>,
    counters: Counters,
}

impl RefreshCoordinator {
    pub fn new(session: Arc<SessionStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            session,
            refresher,
            state: Mutex::new(RefreshState::default()),
            counters: Counters::default(),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn phase(&self) -> RefreshPhase {
        if self.state.lock().refreshing {
            RefreshPhase::Refreshing
        } else {
            RefreshPhase::Normal
        }
    }

    /// Number of requests currently parked behind the in-flight refresh
    pub fn pending_waiters(&self) -> usize {
        self.state.lock().waiters.len()
    }

    pub fn stats(&self) -> RefreshStats {
        RefreshStats {
            refreshes_started: self.counters.started.load(Ordering::SeqCst),
            refreshes_succeeded: self.counters.succeeded.load(Ordering::SeqCst),
            refreshes_failed: self.counters.failed.load(Ordering::SeqCst),
            waiters_queued: self.counters.queued.load(Ordering::SeqCst),
        }
    }

    /// Obtain a fresh access token after a 401.
    ///
    /// The first caller while `Normal` performs the refresh; callers arriving
    /// while `Refreshing` wait for that same outcome. On failure the session
    /// has already been cleared when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::MissingRefreshToken`] when no refresh token was
    /// stored, the refresher's error when the call failed, and
    /// [`RefreshError::Abandoned`] when the leading caller was dropped before
    /// the refresh settled.
    pub async fn recover(&self) -> Result<String, RefreshError> {
        let role = {
            let mut state = self.state.lock();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(Waiter { tx });
                Role::Waiter(rx)
            } else {
                state.refreshing = true;
                Role::Leader
            }
        };

        match role {
            Role::Waiter(rx) => {
                self.counters.queued.fetch_add(1, Ordering::SeqCst);
                debug!("refresh in flight, waiting for its outcome");
                rx.await.unwrap_or(Err(RefreshError::Abandoned))
            }
            Role::Leader => self.lead_refresh().await,
        }
    }

    async fn lead_refresh(&self) -> Result<String, RefreshError> {
        let guard = SettleGuard { coordinator: self, settled: false };

        let Some(refresh_token) = self.session.refresh_token() else {
            warn!("access token rejected and no refresh token stored, clearing session");
            self.counters.failed.fetch_add(1, Ordering::SeqCst);
            self.session.logout();
            guard.settle(Err(RefreshError::MissingRefreshToken));
            return Err(RefreshError::MissingRefreshToken);
        };

        self.counters.started.fetch_add(1, Ordering::SeqCst);
        debug!("refreshing access token");

        match self.refresher.refresh(&refresh_token).await {
            Ok(tokens) => {
                let access_token = tokens.access_token;
                self.session.set_tokens(access_token.clone(), tokens.refresh_token);
                self.counters.succeeded.fetch_add(1, Ordering::SeqCst);
                let woken = guard.settle(Ok(access_token.clone()));
                info!(waiters = woken, "access token refreshed");
                Ok(access_token)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                self.counters.failed.fetch_add(1, Ordering::SeqCst);
                self.session.logout();
                guard.settle(Err(err.clone()));
                Err(err)
            }
        }
    }

    /// Return to `Normal` and hand `outcome` to every parked waiter.
    ///
    /// The flag flip and the queue drain happen under one lock; the sends
    /// happen after it is released.
    fn settle(&self, outcome: &RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.state.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };

        let count = waiters.len();
        for waiter in waiters {
            // Receiver gone means that request was cancelled; nothing to do.
            let _ = waiter.tx.send(outcome.clone());
        }
        count
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("phase", &self.phase())
            .field("pending_waiters", &self.pending_waiters())
            .finish_non_exhaustive()
    }
}

/// Settles the refresh exactly once, even if the leader's future is dropped
/// mid-refresh.
struct SettleGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl SettleGuard<'_> {
    fn settle(mut self, outcome: RefreshOutcome) -> usize {
        self.settled = true;
        self.coordinator.settle(&outcome)
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("refresh leader dropped before completion, releasing waiters");
            self.coordinator.settle(&Err(RefreshError::Abandoned));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use hisris_domain::TokenResponse;

    use super::*;
    use crate::session::Session;

    struct StaticRefresher {
        calls: AtomicUsize,
        result: Result<TokenResponse, RefreshError>,
    }

    impl StaticRefresher {
        fn ok(access: &str, refresh: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Ok(TokenResponse {
                    access_token: access.into(),
                    refresh_token: refresh.into(),
                    token_type: "bearer".into(),
                    expires_in: 900,
                }),
            }
        }

        fn failing(err: RefreshError) -> Self {
            Self { calls: AtomicUsize::new(0), result: Err(err) }
        }
    }

    #[async_trait]
    impl TokenRefresher for StaticRefresher {
        async fn refresh(&self, _refresh_token: &str) -> Result<TokenResponse, RefreshError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn coordinator(
        session: Session,
        refresher: Arc<StaticRefresher>,
    ) -> (RefreshCoordinator, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::with_session(session));
        (RefreshCoordinator::new(store.clone(), refresher), store)
    }

    #[tokio::test]
    async fn successful_refresh_stores_new_tokens() {
        let refresher = Arc::new(StaticRefresher::ok("T2", "R2"));
        let (coordinator, store) = coordinator(Session::authenticated("T1", "R1"), refresher.clone());

        let token = coordinator.recover().await.unwrap();

        assert_eq!(token, "T2");
        assert_eq!(store.access_token().as_deref(), Some("T2"));
        assert_eq!(store.refresh_token().as_deref(), Some("R2"));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.phase(), RefreshPhase::Normal);
        assert_eq!(coordinator.stats().refreshes_succeeded, 1);
    }

    #[tokio::test]
    async fn failed_refresh_clears_session() {
        let refresher = Arc::new(StaticRefresher::failing(RefreshError::Rejected {
            status: 401,
            message: "refresh token expired".into(),
        }));
        let (coordinator, store) = coordinator(Session::authenticated("T1", "R1"), refresher);

        let err = coordinator.recover().await.unwrap_err();

        assert!(matches!(err, RefreshError::Rejected { status: 401, .. }));
        assert!(store.snapshot().is_empty());
        assert_eq!(coordinator.phase(), RefreshPhase::Normal);
        assert_eq!(coordinator.stats().refreshes_failed, 1);
    }

    #[tokio::test]
    async fn missing_refresh_token_skips_refresher() {
        let refresher = Arc::new(StaticRefresher::ok("T2", "R2"));
        let (coordinator, store) = coordinator(Session::default(), refresher.clone());

        let err = coordinator.recover().await.unwrap_err();

        assert_eq!(err, RefreshError::MissingRefreshToken);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
        assert!(!store.is_authenticated());
        assert_eq!(coordinator.stats().refreshes_started, 0);
    }

    #[tokio::test]
    async fn coordinator_is_reusable_after_settling() {
        let refresher = Arc::new(StaticRefresher::ok("T2", "R2"));
        let (coordinator, _store) = coordinator(Session::authenticated("T1", "R1"), refresher.clone());

        coordinator.recover().await.unwrap();
        coordinator.recover().await.unwrap();

        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(coordinator.pending_waiters(), 0);
    }
}
