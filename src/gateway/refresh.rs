use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::response::ApiResponse;
use crate::transport::{OutgoingRequest, Transport};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// `{ "data": { "accessToken": ..., "refreshToken": ... } }`, shared by refresh and login.
#[derive(Deserialize)]
struct TokenEnvelope {
    data: IssuedTokens,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for IssuedTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedTokens")
            .field("access_token_len", &self.access_token.len())
            .field("refresh_token_len", &self.refresh_token.len())
            .finish()
    }
}

impl IssuedTokens {
    pub fn from_response(resp: &ApiResponse) -> Result<Self, Error> {
        if !resp.is_success() {
            return Err(Error::RefreshRejected(resp.status()));
        }
        let envelope: TokenEnvelope = serde_json::from_slice(resp.body())
            .map_err(|e| Error::RefreshContract(e.to_string()))?;
        let tokens = envelope.data;
        if tokens.access_token.is_empty() {
            return Err(Error::RefreshContract("empty data.accessToken".into()));
        }
        if tokens.refresh_token.is_empty() {
            return Err(Error::RefreshContract("empty data.refreshToken".into()));
        }
        Ok(tokens)
    }
}

/// `POST <auth-base>/refresh-token`. Goes straight to the transport: a failure here
/// never re-enters the 401 handling.
pub(crate) async fn exchange<T: Transport>(
    transport: &T,
    refresh_url: &str,
    refresh_token: &str,
) -> Result<IssuedTokens, Error> {
    let body = serde_json::to_value(RefreshRequest { refresh_token })?;
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let resp = transport
        .send(OutgoingRequest {
            method: Method::POST,
            url: refresh_url.to_string(),
            headers,
            body: Some(body),
            query: Vec::new(),
        })
        .await?;
    IssuedTokens::from_response(&resp)
}
