//! read configuration from a file or the environment

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use crate::errors::Error;

const DEFAULT_LOGIN_URL: &str = "/login";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub enum ConfigLocation {
    File(PathBuf),
    Env,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub api_base: String,
    #[serde(default)]
    pub auth_base: Option<String>,
    #[serde(default)]
    pub login_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

pub fn read_config(loc: ConfigLocation) -> Result<Config, Error> {
    match loc {
        ConfigLocation::File(path) => Config::from_file(path),
        ConfigLocation::Env => Config::from_env(),
    }
}

impl Config {
    pub fn from_values(
        api_base: impl Into<String>,
        auth_base: Option<String>,
        login_url: Option<String>,
        request_timeout_secs: Option<u64>,
        credentials_path: Option<PathBuf>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            auth_base,
            login_url,
            request_timeout_secs,
            credentials_path,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// # ENV Vars
    /// * `JEWELRY_API_BASE` - backend origin, e.g. `https://shop.example.com/api`
    /// * `JEWELRY_AUTH_BASE` - optional override for the auth endpoints
    /// * `JEWELRY_LOGIN_URL` - where an invalidated session is sent
    /// * `JEWELRY_REQUEST_TIMEOUT_SECS` - per-request timeout
    /// * `JEWELRY_CREDENTIALS_PATH` - persist tokens to this JSON file
    pub fn from_env() -> Result<Self, Error> {
        let api_base = std::env::var("JEWELRY_API_BASE")
            .map_err(|_| Error::Config("Missing JEWELRY_API_BASE env var".to_string()))?;
        let request_timeout_secs = match std::env::var("JEWELRY_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!(
                    "Invalid JEWELRY_REQUEST_TIMEOUT_SECS '{}': {}",
                    raw, e
                ))
            })?),
            Err(_) => None,
        };
        let config = Config {
            api_base,
            auth_base: std::env::var("JEWELRY_AUTH_BASE").ok(),
            login_url: std::env::var("JEWELRY_LOGIN_URL").ok(),
            request_timeout_secs,
            credentials_path: std::env::var("JEWELRY_CREDENTIALS_PATH")
                .ok()
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        reqwest::Url::parse(self.api_base()).map_err(|e| {
            Error::Config(format!("Invalid API base URL '{}': {}", self.api_base, e))
        })?;
        if let Some(auth) = &self.auth_base {
            reqwest::Url::parse(auth).map_err(|e| {
                Error::Config(format!("Invalid auth base URL '{}': {}", auth, e))
            })?;
        }
        if self.request_timeout_secs == Some(0) {
            return Err(Error::Config("Request timeout must be > 0".into()));
        }
        Ok(())
    }

    pub fn api_base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    /// Versioned root that relative request paths hang off.
    pub fn api_root(&self) -> String {
        format!("{}/v1", self.api_base())
    }

    pub fn auth_base(&self) -> String {
        match &self.auth_base {
            Some(auth) => auth.trim_end_matches('/').to_string(),
            None => format!("{}/auth", self.api_root()),
        }
    }

    pub fn refresh_url(&self) -> String {
        format!("{}/refresh-token", self.auth_base())
    }

    pub fn login_endpoint(&self) -> String {
        format!("{}/login", self.auth_base())
    }

    pub fn login_url(&self) -> &str {
        self.login_url.as_deref().unwrap_or(DEFAULT_LOGIN_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn credential_store(&self) -> Arc<dyn CredentialStore> {
        match &self.credentials_path {
            Some(path) => Arc::new(FileCredentialStore::new(path.clone())),
            None => Arc::new(MemoryCredentialStore::new()),
        }
    }
}
