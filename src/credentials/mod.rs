mod file;
mod memory;

pub use file::{FileCredentialStore, StoredCredentials};
pub use memory::MemoryCredentialStore;

use std::fmt;

/// Access and refresh token, always saved and cleared together.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    pub fn access(&self) -> Option<&str> {
        non_empty(&self.access_token)
    }

    pub fn refresh(&self) -> Option<&str> {
        non_empty(&self.refresh_token)
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token_len", &self.access_token.len())
            .field("refresh_token_len", &self.refresh_token.len())
            .finish()
    }
}

/// Holds the current session credentials.
///
/// Reads treat an empty token as absent. Methods are synchronous and are
/// called from inside async request handling, so implementations should not
/// block for long.
pub trait CredentialStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn save_tokens(&self, access_token: &str, refresh_token: &str);
    fn clear_tokens(&self);
}

fn non_empty(token: &str) -> Option<&str> {
    if token.is_empty() { None } else { Some(token) }
}
