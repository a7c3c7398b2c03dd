use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{CredentialPair, CredentialStore};
use crate::errors::Error;

/// On-disk shape of a persisted session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    pub access_token: String,
    pub refresh_token: String,
    pub saved_at: Timestamp,
}

impl StoredCredentials {
    pub fn pair(&self) -> CredentialPair {
        CredentialPair::new(self.access_token.clone(), self.refresh_token.clone())
    }
}

/// Persists the credential pair as a JSON file so a session survives restarts.
///
/// The store contract is infallible: read failures are logged and treated as
/// "no credentials", write failures are logged and dropped.
///
/// Every trait method does blocking `std::fs` I/O on the calling thread,
/// including when [`Gateway::execute`](crate::Gateway::execute) calls it from
/// async code. A 401 reads the file more than once. Keep the file on local disk.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<StoredCredentials>, Error> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn load_or_log(&self) -> Option<CredentialPair> {
        match self.load() {
            Ok(stored) => stored.map(|s| s.pair()),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "credentials.read_failed");
                None
            }
        }
    }

    fn write(&self, stored: &StoredCredentials) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(stored)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn access_token(&self) -> Option<String> {
        self.load_or_log()
            .and_then(|pair| pair.access().map(str::to_owned))
    }

    fn refresh_token(&self) -> Option<String> {
        self.load_or_log()
            .and_then(|pair| pair.refresh().map(str::to_owned))
    }

    fn save_tokens(&self, access_token: &str, refresh_token: &str) {
        let stored = StoredCredentials {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            saved_at: Timestamp::now(),
        };
        match self.write(&stored) {
            Ok(()) => debug!(path = %self.path.display(), "credentials.saved"),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "credentials.write_failed")
            }
        }
    }

    fn clear_tokens(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "credentials.cleared"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "credentials.clear_failed")
            }
        }
    }
}
