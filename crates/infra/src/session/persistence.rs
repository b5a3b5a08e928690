//! File-backed session storage
//!
//! The file holds tokens, so it is created owner-readable only on unix and
//! replaced atomically via a temporary file and rename.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use hisris_core::{Session, SessionStore};
use hisris_domain::Result;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::InfraError;

/// JSON file holding the last known [`Session`]
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session.
    ///
    /// Returns `Ok(None)` if the file does not exist or holds no access
    /// token.
    ///
    /// # Errors
    /// `HisRisError::Storage` if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Option<Session>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(InfraError::from(err).into()),
        };

        let session: Session = serde_json::from_str(&contents).map_err(InfraError::from)?;
        let session = session.normalized();
        Ok((!session.is_empty()).then_some(session))
    }

    /// Write `session`, replacing any previous file.
    ///
    /// # Errors
    /// `HisRisError::Storage` if the directory or file cannot be written.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(InfraError::from)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(session).map_err(InfraError::from)?;
        let tmp = self.tmp_path();
        write_private(&tmp, &bytes).map_err(InfraError::from)?;
        fs::rename(&tmp, &self.path).map_err(InfraError::from)?;
        Ok(())
    }

    /// Delete the file; a missing file is not an error.
    ///
    /// # Errors
    /// `HisRisError::Storage` if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Seed `store` from `storage`.
///
/// A corrupt file is logged, removed and treated as signed out. Returns
/// whether a session was restored.
///
/// # Errors
/// `HisRisError::Storage` if a corrupt file cannot be removed.
pub fn restore_session(store: &SessionStore, storage: &FileSessionStorage) -> Result<bool> {
    match storage.load() {
        Ok(Some(session)) => {
            let has_user = session.user().is_some();
            store.restore(session);
            info!(path = %storage.path().display(), has_user, "session restored");
            Ok(true)
        }
        Ok(None) => Ok(false),
        Err(err) => {
            warn!(
                path = %storage.path().display(),
                error = %err,
                "discarding unreadable session file"
            );
            storage.clear()?;
            Ok(false)
        }
    }
}

/// Mirror every change of `store` into `storage` until the store is dropped.
///
/// Logout removes the file. Write failures are logged and do not stop the
/// task. Must be called from within a tokio runtime.
pub fn spawn_session_persistence(
    store: &SessionStore,
    storage: FileSessionStorage,
) -> JoinHandle<()> {
    let mut changes = store.subscribe();

    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let session = changes.borrow_and_update().clone();
            let result = if session.is_empty() { storage.clear() } else { storage.save(&session) };

            match result {
                Ok(()) => debug!(
                    path = %storage.path().display(),
                    authenticated = session.is_authenticated(),
                    "session persisted"
                ),
                Err(err) => warn!(
                    path = %storage.path().display(),
                    error = %err,
                    "failed to persist session"
                ),
            }
        }
        debug!("session store dropped, persistence stopped");
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("session.json"));

        assert!(storage.load().unwrap().is_none());
        storage.clear().unwrap();
    }

    #[test]
    fn save_then_load_keeps_tokens() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("nested/session.json"));

        storage.save(&Session::authenticated("T1", "R1")).unwrap();
        let loaded = storage.load().unwrap().expect("session");

        assert_eq!(loaded.access_token(), Some("T1"));
        assert_eq!(loaded.refresh_token(), Some("R1"));
        assert!(!dir.path().join("nested/session.json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("session.json"));
        storage.save(&Session::authenticated("T1", "R1")).unwrap();

        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn refresh_token_without_access_token_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"access_token": null, "refresh_token": "R1", "user": null}"#)
            .unwrap();

        let storage = FileSessionStorage::new(path);

        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_discarded_on_restore() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        let storage = FileSessionStorage::new(path.clone());
        let store = SessionStore::new();

        let restored = restore_session(&store, &storage).unwrap();

        assert!(!restored);
        assert!(!path.exists());
        assert!(!store.is_authenticated());
    }
}
