mod impls;

use crate::gateway::Gateway;
use crate::transport::ReqwestTransport;

/// JSON front door to the backend. Successful bodies decode into caller types,
/// failures come back classified as [`crate::ApiError`].
pub struct ApiClient<T = ReqwestTransport> {
    gateway: Gateway<T>,
    login_endpoint: String,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            login_endpoint: self.login_endpoint.clone(),
        }
    }
}
