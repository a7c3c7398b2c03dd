use std::sync::{PoisonError, RwLock};

use super::{CredentialPair, CredentialStore};

/// In-process credential store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    pair: RwLock<Option<CredentialPair>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            pair: RwLock::new(Some(CredentialPair::new(access_token, refresh_token))),
        }
    }

    pub fn snapshot(&self) -> Option<CredentialPair> {
        self.pair
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn access_token(&self) -> Option<String> {
        let pair = self.pair.read().unwrap_or_else(PoisonError::into_inner);
        pair.as_ref().and_then(|p| p.access()).map(str::to_owned)
    }

    fn refresh_token(&self) -> Option<String> {
        let pair = self.pair.read().unwrap_or_else(PoisonError::into_inner);
        pair.as_ref().and_then(|p| p.refresh()).map(str::to_owned)
    }

    fn save_tokens(&self, access_token: &str, refresh_token: &str) {
        let mut pair = self.pair.write().unwrap_or_else(PoisonError::into_inner);
        *pair = Some(CredentialPair::new(access_token, refresh_token));
    }

    fn clear_tokens(&self) {
        let mut pair = self.pair.write().unwrap_or_else(PoisonError::into_inner);
        *pair = None;
    }
}
