//! Authenticated request pipeline.
//!
//! Every call gets the current bearer token. A 401 triggers at most one
//! refresh across all concurrent callers, after which each caller re-sends its
//! original request exactly once.

mod gate;
mod refresh;

pub use gate::{GateState, RefreshGate, RefreshPermit};
pub use refresh::IssuedTokens;

use std::sync::Arc;

use jiff::Timestamp;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::request::RequestDescriptor;
use crate::response::Outcome;
use crate::session::SessionHook;
use crate::telemetry::refresh::RefreshTelemetry;
use crate::transport::{OutgoingRequest, Transport};

pub struct Gateway<T> {
    transport: Arc<T>,
    credentials: Arc<dyn CredentialStore>,
    session: Arc<dyn SessionHook>,
    gate: Arc<RefreshGate>,
    api_root: String,
    refresh_url: String,
}

impl<T> Clone for Gateway<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            credentials: Arc::clone(&self.credentials),
            session: Arc::clone(&self.session),
            gate: Arc::clone(&self.gate),
            api_root: self.api_root.clone(),
            refresh_url: self.refresh_url.clone(),
        }
    }
}

impl<T: Transport> Gateway<T> {
    pub fn new(
        config: &Config,
        transport: T,
        credentials: Arc<dyn CredentialStore>,
        session: Arc<dyn SessionHook>,
    ) -> Self {
        Self {
            transport: Arc::new(transport),
            credentials,
            session,
            gate: Arc::new(RefreshGate::new()),
            api_root: config.api_root(),
            refresh_url: config.refresh_url(),
        }
    }

    pub fn gate(&self) -> &RefreshGate {
        &self.gate
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `request` with the current credential, refreshing once on 401.
    ///
    /// Non-401 responses and transport failures come back unchanged. When the
    /// session cannot be refreshed the original 401 is returned.
    pub async fn execute(&self, request: &RequestDescriptor) -> Outcome {
        self.gate.wait_until_unlocked().await;

        let sent_token = self.credentials.access_token();
        let outcome = self.dispatch(request, sent_token.as_deref()).await;
        if !matches!(&outcome, Ok(resp) if resp.is_unauthorized()) {
            return outcome;
        }
        warn!(
            method = %request.method(),
            path = %request.target(),
            status = 401,
            "gateway.unauthorized"
        );

        loop {
            if let Some(permit) = self.gate.try_acquire() {
                return self
                    .refresh_and_retry(request, sent_token, outcome, permit)
                    .await;
            }
            debug!(path = %request.target(), "gateway.wait_for_refresh");
            self.gate.wait_until_unlocked().await;

            // The holder released without replacing the refused credential.
            if sent_token.is_some() && self.credentials.access_token() == sent_token {
                debug!(path = %request.target(), "gateway.credential_unchanged");
                continue;
            }
            return self.retry(request).await;
        }
    }

    /// Sends without a bearer token and without 401 handling.
    pub(crate) async fn send_unauthenticated(&self, request: &RequestDescriptor) -> Outcome {
        self.dispatch(request, None).await
    }

    async fn refresh_and_retry(
        &self,
        request: &RequestDescriptor,
        sent_token: Option<String>,
        original: Outcome,
        permit: RefreshPermit<'_>,
    ) -> Outcome {
        // Another caller finished a refresh while this request was in flight.
        if self.credentials.access_token() != sent_token {
            drop(permit);
            debug!(path = %request.target(), "gateway.credential_already_rotated");
            return self.retry(request).await;
        }

        let telemetry = RefreshTelemetry::new(format!("{} {}", request.method(), request.target()));

        let Some(refresh_token) = self.credentials.refresh_token() else {
            telemetry.emit_skipped(Timestamp::now());
            self.terminate_session();
            drop(permit);
            return original;
        };

        telemetry.emit_start(Timestamp::now());
        match refresh::exchange(&*self.transport, &self.refresh_url, &refresh_token).await {
            Ok(tokens) => {
                self.credentials
                    .save_tokens(&tokens.access_token, &tokens.refresh_token);
                telemetry.emit_success(tokens.access_token.len(), Timestamp::now());
                drop(permit);
                self.retry(request).await
            }
            Err(err) => {
                telemetry.emit_failure(&err, Timestamp::now());
                self.terminate_session();
                drop(permit);
                original
            }
        }
    }

    /// The single re-send. Its result is final, including another 401.
    async fn retry(&self, request: &RequestDescriptor) -> Outcome {
        let token = self.credentials.access_token();
        info!(
            method = %request.method(),
            path = %request.target(),
            has_token = token.is_some(),
            "gateway.retry"
        );
        self.dispatch(request, token.as_deref()).await
    }

    async fn dispatch(&self, request: &RequestDescriptor, token: Option<&str>) -> Outcome {
        let outgoing = self.outgoing(request, token);
        self.transport.send(outgoing).await
    }

    fn outgoing(&self, request: &RequestDescriptor, token: Option<&str>) -> OutgoingRequest {
        let mut headers: HeaderMap = request.headers().clone();
        if headers.remove(AUTHORIZATION).is_some() {
            warn!(path = %request.target(), "gateway.caller_authorization_dropped");
        }
        if let Some(token) = token {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!(token_len = token.len(), "gateway.unencodable_token"),
            }
        }
        OutgoingRequest {
            method: request.method().clone(),
            url: request.resolve_url(&self.api_root),
            headers,
            body: request.body().cloned(),
            query: request.query().to_vec(),
        }
    }

    fn terminate_session(&self) {
        self.credentials.clear_tokens();
        warn!("session.invalidated");
        self.session.on_session_invalid();
    }
}
