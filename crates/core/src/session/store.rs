//! Session store
//!
//! The store wraps a `tokio::sync::watch` channel: the sender holds the
//! authoritative [`Session`] and every subscriber sees each change. All
//! mutations are synchronous, so callers can read and write it from inside
//! request handling without suspending.

use hisris_domain::UserProfile;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Authentication state of the client
///
/// `is_authenticated()` is derived from the access token, so the two can
/// never disagree.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserProfile>,
}

impl Session {
    /// Session holding a freshly issued token pair
    pub fn authenticated(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            user: None,
        }
    }

    #[must_use]
    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = Some(user);
        self
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// True when nothing at all is held
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }

    /// Drop partially cleared state: without an access token nothing else is
    /// kept.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.access_token.is_some() {
            self
        } else {
            Self::default()
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user.as_ref().map(|u| &u.username))
            .field("is_authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Authoritative holder of the current [`Session`]
pub struct SessionStore {
    state: watch::Sender<Session>,
}

impl SessionStore {
    /// Create an empty (signed out) store
    pub fn new() -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { state }
    }

    /// Create a store seeded with a previously persisted session
    pub fn with_session(session: Session) -> Self {
        let (state, _) = watch::channel(session.normalized());
        Self { state }
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.borrow().refresh_token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Replace both tokens; the user profile is kept
    pub fn set_tokens(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        let access_token = access_token.into();
        let refresh_token = refresh_token.into();
        self.state.send_modify(|session| {
            session.access_token = Some(access_token);
            session.refresh_token = Some(refresh_token);
        });
        debug!("session tokens replaced");
    }

    /// Attach the profile resolved from `/auth/me`
    pub fn set_user(&self, user: UserProfile) {
        debug!(username = %user.username, "session user set");
        self.state.send_modify(|session| session.user = Some(user));
    }

    /// Replace the whole session, e.g. when rehydrating from storage
    pub fn restore(&self, session: Session) {
        self.state.send_replace(session.normalized());
    }

    /// Clear tokens and user in one step.
    ///
    /// Idempotent: clearing an empty session does not notify subscribers.
    pub fn logout(&self) {
        let cleared = self.state.send_if_modified(|session| {
            if session.is_empty() {
                false
            } else {
                *session = Session::default();
                true
            }
        });
        if cleared {
            debug!("session cleared");
        }
    }

    /// Receiver that observes every session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("session", &*self.state.borrow()).finish()
    }
}
