//! Wiring from a [`ClientConfig`] to a ready-to-use client

use std::sync::Arc;

use hisris_core::SessionStore;
use hisris_domain::{ClientConfig, HisRisError};
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::{ApiClient, ApiClientConfig};
use crate::config;
use crate::session::{restore_session, spawn_session_persistence, FileSessionStorage};

/// A configured client plus its session persistence task, if any
#[derive(Debug)]
pub struct ClientHandle {
    pub client: Arc<ApiClient>,
    /// Ends once every clone of `client` has been dropped
    pub persistence: Option<JoinHandle<()>>,
}

/// Build an [`ApiClient`], restoring and persisting the session when
/// `config.session.persist_path` is set.
///
/// Must be called from within a tokio runtime when persistence is enabled.
///
/// # Errors
/// `HisRisError::Config` for invalid settings, `HisRisError::Storage` if a
/// corrupt session file cannot be removed.
pub fn connect(config: &ClientConfig) -> Result<ClientHandle, HisRisError> {
    config::validate(config)?;

    let session = Arc::new(SessionStore::new());
    let storage = config.session.persist_path.clone().map(FileSessionStorage::new);
    if let Some(storage) = &storage {
        restore_session(&session, storage)?;
    }

    let client = ApiClient::new(ApiClientConfig::from(&config.api), session.clone())?;
    let persistence = storage.map(|storage| spawn_session_persistence(&session, storage));

    info!(
        base_url = %config.api.base_url,
        authenticated = session.is_authenticated(),
        persisted = persistence.is_some(),
        "API client ready"
    );

    Ok(ClientHandle { client: Arc::new(client), persistence })
}
