use std::future::Future;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};

use crate::config::Config;
use crate::errors::Error;
use crate::response::{ApiResponse, Outcome, TransportFailure};

pub const USER_AGENT: &str = concat!("jewelry-api-client/", env!("CARGO_PKG_VERSION"));

/// A request with its URL resolved and its final header set.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    pub query: Vec<(String, String)>,
}

/// Performs a single HTTP exchange. No retries, no auth handling.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: OutgoingRequest) -> impl Future<Output = Outcome> + Send;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Outcome {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(TransportFailure::from)?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(TransportFailure::from)?;
        Ok(ApiResponse::new(status, headers, body.to_vec()))
    }
}
