use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde_json::{Value, json};

use crate::{
    ApiResponse, Config, Gateway, MemoryCredentialStore, Outcome, OutgoingRequest, SessionHook,
    Transport, TransportFailure,
};

pub const API_BASE: &str = "https://shop.test";
pub const PRODUCTS_URL: &str = "https://shop.test/v1/products";
pub const REFRESH_URL: &str = "https://shop.test/v1/auth/refresh-token";

pub use super::logs::{capture_logs, drain_logs};

pub fn config() -> Config {
    Config::from_values(API_BASE, None, None, None, None)
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl From<&OutgoingRequest> for RecordedCall {
    fn from(request: &OutgoingRequest) -> Self {
        Self {
            method: request.method.to_string(),
            url: request.url.clone(),
            authorization: request
                .headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body: request.body.clone(),
            query: request.query.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Reply {
    outcome: Outcome,
    delay: Duration,
}

impl Reply {
    pub fn status(code: u16) -> Self {
        Self::json(code, Value::Null)
    }

    pub fn json(code: u16, body: Value) -> Self {
        let status = StatusCode::from_u16(code).unwrap();
        let bytes = if body.is_null() {
            Vec::new()
        } else {
            body.to_string().into_bytes()
        };
        Self {
            outcome: Ok(ApiResponse::new(status, HeaderMap::new(), bytes)),
            delay: Duration::ZERO,
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            outcome: Err(TransportFailure::new(message)),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub fn tokens_body(access: &str, refresh: &str) -> Value {
    json!({ "data": { "accessToken": access, "refreshToken": refresh } })
}

pub fn expired_body() -> Value {
    json!({ "messageKey": "auth.tokenExpired" })
}

type Responder = Box<dyn Fn(&RecordedCall) -> Reply + Send + Sync>;

/// Records every call and answers from a closure.
pub struct ScriptedTransport {
    calls: Mutex<Vec<RecordedCall>>,
    responder: Responder,
}

impl ScriptedTransport {
    pub fn new(responder: impl Fn(&RecordedCall) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// `/products` accepts only `Bearer A2`; the refresh endpoint answers with `refresh`.
    pub fn token_aware(refresh: Reply) -> Self {
        Self::new(move |call| {
            if call.url == REFRESH_URL {
                return refresh.clone();
            }
            match call.authorization.as_deref() {
                Some("Bearer A2") => Reply::json(200, json!([{ "id": 1, "name": "ring" }])),
                _ => Reply::json(401, expired_body()).delayed(Duration::from_millis(10)),
            }
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.url == url)
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: OutgoingRequest) -> impl Future<Output = Outcome> + Send {
        let call = RecordedCall::from(&request);
        let reply = (self.responder)(&call);
        self.calls.lock().unwrap().push(call);
        async move {
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            reply.outcome
        }
    }
}

#[derive(Default)]
pub struct CountingHook {
    fired: AtomicUsize,
}

impl CountingHook {
    pub fn fired(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}

impl SessionHook for CountingHook {
    fn on_session_invalid(&self) {
        self.fired.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn gateway(
    store: &Arc<MemoryCredentialStore>,
    transport: ScriptedTransport,
    hook: &Arc<CountingHook>,
) -> Gateway<ScriptedTransport> {
    Gateway::new(&config(), transport, store.clone(), hook.clone())
}
