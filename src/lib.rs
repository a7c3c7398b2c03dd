//! Client for the jewelry retail admin API: bearer auth with single-flight
//! token refresh, and typed error classification.

mod client;
pub mod classify;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod gateway;
pub mod request;
pub mod response;
pub mod session;
pub mod telemetry;
pub mod transport;

pub use classify::{ApiError, ErrorKind, classify};
pub use client::ApiClient;
pub use config::{Config, ConfigLocation, read_config};
pub use credentials::{CredentialPair, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use errors::Error;
pub use gateway::{GateState, Gateway};
pub use request::RequestDescriptor;
pub use response::{ApiResponse, Outcome, TransportFailure};
pub use session::{LoginRedirectHook, SessionHook};
pub use transport::{OutgoingRequest, ReqwestTransport, Transport};

#[cfg(test)]
mod tests;
