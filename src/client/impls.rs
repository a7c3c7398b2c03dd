use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::{
    ApiClient,
    classify::{ApiError, classify},
    config::Config,
    errors::Error,
    gateway::{Gateway, IssuedTokens},
    request::RequestDescriptor,
    session::SessionHook,
    transport::{ReqwestTransport, Transport},
};

impl ApiClient<ReqwestTransport> {
    /// Builds a client over `reqwest`, with the credential store the config asks for.
    pub fn from_config(config: &Config, session: Arc<dyn SessionHook>) -> Result<Self, Error> {
        config.validate()?;
        let transport = ReqwestTransport::new(config)?;
        let gateway = Gateway::new(config, transport, config.credential_store(), session);
        Ok(Self::new(gateway, config))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(gateway: Gateway<T>, config: &Config) -> Self {
        Self {
            gateway,
            login_endpoint: config.login_endpoint(),
        }
    }

    pub fn gateway(&self) -> &Gateway<T> {
        &self.gateway
    }

    pub async fn send<R: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<R, ApiError> {
        let outcome = self.gateway.execute(&request).await;
        match &outcome {
            Ok(resp) if resp.is_success() => resp.json().map_err(|err| {
                warn!(
                    path = %request.target(),
                    status = resp.status().as_u16(),
                    error = %err,
                    "client.decode_failed"
                );
                ApiError::decode(resp.status())
            }),
            _ => Err(classify(&outcome)),
        }
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(RequestDescriptor::get(path)).await
    }

    pub async fn get_with_query<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<R, ApiError> {
        let request = query
            .iter()
            .fold(RequestDescriptor::get(path), |req, (k, v)| req.with_query(*k, *v));
        self.send(request).await
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(with_body(RequestDescriptor::post(path), body)?).await
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(with_body(RequestDescriptor::put(path), body)?).await
    }

    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(with_body(RequestDescriptor::patch(path), body)?).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(RequestDescriptor::delete(path)).await
    }

    /// Exchanges email/password for a session and stores it.
    ///
    /// A 401 here means bad credentials, so it skips the refresh flow.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let request = with_body(
            RequestDescriptor::post(self.login_endpoint.as_str()),
            &serde_json::json!({ "email": email, "password": password }),
        )?;
        let outcome = self.gateway.send_unauthenticated(&request).await;
        let resp = match &outcome {
            Ok(resp) if resp.is_success() => resp,
            _ => return Err(classify(&outcome)),
        };
        let tokens = IssuedTokens::from_response(resp).map_err(|err| {
            warn!(error = %err, "client.login_payload_invalid");
            ApiError::decode(resp.status())
        })?;
        self.gateway
            .credentials()
            .save_tokens(&tokens.access_token, &tokens.refresh_token);
        info!(access_token_len = tokens.access_token.len(), "client.logged_in");
        Ok(())
    }

    /// Drops the local session. The session hook is not involved.
    pub fn logout(&self) {
        self.gateway.credentials().clear_tokens();
        info!("client.logged_out");
    }
}

fn with_body<B: Serialize + ?Sized>(
    request: RequestDescriptor,
    body: &B,
) -> Result<RequestDescriptor, ApiError> {
    request.with_json(body).map_err(|err| {
        warn!(error = %err, "client.encode_failed");
        ApiError::encode()
    })
}
