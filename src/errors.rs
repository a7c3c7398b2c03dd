use reqwest::StatusCode;

use crate::response::TransportFailure;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("http client error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("{0}")]
    Transport(#[from] TransportFailure),
    #[error("token endpoint answered {0}")]
    RefreshRejected(StatusCode),
    #[error("token endpoint returned an unexpected payload: {0}")]
    RefreshContract(String),
}
