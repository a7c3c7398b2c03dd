#![allow(dead_code)]

mod logs;

use std::sync::Arc;

use jewelry_api_client::{
    ApiClient, Config, Gateway, LoginRedirectHook, MemoryCredentialStore, ReqwestTransport,
};
use serde_json::{Value, json};
use wiremock::MockServer;

pub use logs::capture_logs;

pub fn config(server_uri: &str) -> Config {
    Config::from_values(server_uri, None, Some("/login".into()), Some(5), None)
}

pub fn client(
    server: &MockServer,
    store: &Arc<MemoryCredentialStore>,
    hook: &Arc<LoginRedirectHook>,
) -> ApiClient {
    client_for(&server.uri(), store, hook)
}

pub fn client_for(
    server_uri: &str,
    store: &Arc<MemoryCredentialStore>,
    hook: &Arc<LoginRedirectHook>,
) -> ApiClient {
    let config = config(server_uri);
    let transport = ReqwestTransport::new(&config).expect("transport");
    let gateway = Gateway::new(&config, transport, store.clone(), hook.clone());
    ApiClient::new(gateway, &config)
}

pub fn hook() -> Arc<LoginRedirectHook> {
    Arc::new(LoginRedirectHook::new("/login"))
}

pub fn tokens_body(access: &str, refresh: &str) -> Value {
    json!({ "data": { "accessToken": access, "refreshToken": refresh } })
}
