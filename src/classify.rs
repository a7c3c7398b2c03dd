//! Turns a transport outcome into one typed error kind for presentation layers.
//!
//! Every variant carries a message key, a stable identifier rather than a
//! human string, so callers can localize.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;

use crate::response::Outcome;

pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

pub const NETWORK_KEY: &str = "errors.network";
pub const UNKNOWN_KEY: &str = "errors.unknown";
pub const DECODE_KEY: &str = "errors.decode";
pub const ENCODE_KEY: &str = "errors.encode";

const STATUS_KEYS: &[(u16, &str)] = &[
    (400, "errors.badRequest"),
    (401, "errors.unauthorized"),
    (403, "errors.forbidden"),
    (404, "errors.notFound"),
    (409, "errors.conflict"),
    (422, "errors.validation"),
    (429, "errors.tooManyRequests"),
    (500, "errors.internalServer"),
    (502, "errors.badGateway"),
    (503, "errors.serviceUnavailable"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Validation,
    Auth,
    Permission,
    NotFound,
    RateLimit,
    Server,
    Generic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Validation => "validation",
            ErrorKind::Auth => "auth",
            ErrorKind::Permission => "permission",
            ErrorKind::NotFound => "not_found",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Server => "server",
            ErrorKind::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// Field name to the messages the backend reported for it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{message_key}")]
    Network { message_key: String, detail: String },
    #[error("{message_key}")]
    Validation {
        message_key: String,
        fields: FieldErrors,
    },
    #[error("{message_key}")]
    Auth { message_key: String },
    #[error("{message_key}")]
    Permission { message_key: String },
    #[error("{message_key}")]
    NotFound { message_key: String },
    #[error("{message_key}")]
    RateLimit {
        message_key: String,
        retry_after: Duration,
    },
    #[error("{message_key}")]
    Server {
        message_key: String,
        status: StatusCode,
    },
    #[error("{message_key}")]
    Generic {
        message_key: String,
        status: Option<StatusCode>,
    },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::Auth { .. } => ErrorKind::Auth,
            ApiError::Permission { .. } => ErrorKind::Permission,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::RateLimit { .. } => ErrorKind::RateLimit,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Generic { .. } => ErrorKind::Generic,
        }
    }

    pub fn message_key(&self) -> &str {
        match self {
            ApiError::Network { message_key, .. }
            | ApiError::Validation { message_key, .. }
            | ApiError::Auth { message_key }
            | ApiError::Permission { message_key }
            | ApiError::NotFound { message_key }
            | ApiError::RateLimit { message_key, .. }
            | ApiError::Server { message_key, .. }
            | ApiError::Generic { message_key, .. } => message_key,
        }
    }

    /// HTTP status when one is known. Only `Server` and `Generic` keep it.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Generic { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn decode(status: StatusCode) -> Self {
        ApiError::Generic {
            message_key: DECODE_KEY.to_string(),
            status: Some(status),
        }
    }

    pub(crate) fn encode() -> Self {
        ApiError::Generic {
            message_key: ENCODE_KEY.to_string(),
            status: None,
        }
    }
}

pub fn classify(outcome: &Outcome) -> ApiError {
    match outcome {
        Ok(resp) => {
            let body = resp.json_value();
            classify_status(resp.status(), resp.headers(), body.as_ref())
        }
        Err(failure) => ApiError::Network {
            message_key: NETWORK_KEY.to_string(),
            detail: failure.message().to_string(),
        },
    }
}

pub fn classify_status(status: StatusCode, headers: &HeaderMap, body: Option<&Value>) -> ApiError {
    let message_key = message_key(status, body);
    match status.as_u16() {
        400 | 422 => ApiError::Validation {
            message_key,
            fields: field_errors(body),
        },
        401 => ApiError::Auth { message_key },
        403 => ApiError::Permission { message_key },
        404 => ApiError::NotFound { message_key },
        429 => ApiError::RateLimit {
            message_key,
            retry_after: retry_after(headers, body),
        },
        500 | 503 => ApiError::Server {
            message_key,
            status,
        },
        _ => ApiError::Generic {
            message_key,
            status: Some(status),
        },
    }
}

pub fn status_message_key(status: StatusCode) -> Option<&'static str> {
    STATUS_KEYS
        .iter()
        .find(|(code, _)| *code == status.as_u16())
        .map(|(_, key)| *key)
}

fn message_key(status: StatusCode, body: Option<&Value>) -> String {
    let field = |name: &str| {
        body.and_then(|b| b.get(name))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };
    field("messageKey")
        .or_else(|| status_message_key(status))
        .or_else(|| field("message"))
        .unwrap_or(UNKNOWN_KEY)
        .to_string()
}

fn retry_after(headers: &HeaderMap, body: Option<&Value>) -> Duration {
    let from_body = body.and_then(|b| b.get("retryAfter")).and_then(|v| match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });
    let from_header = || {
        headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
    };
    from_body
        .or_else(from_header)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

fn field_errors(body: Option<&Value>) -> FieldErrors {
    let Some(Value::Object(errors)) = body.and_then(|b| b.get("errors")) else {
        return FieldErrors::new();
    };
    errors
        .iter()
        .map(|(field, messages)| {
            let messages = match messages {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect(),
                other => vec![other.to_string()],
            };
            (field.clone(), messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{ApiResponse, TransportFailure};
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn status(code: u16) -> StatusCode {
        StatusCode::from_u16(code).expect("valid status")
    }

    #[test]
    fn maps_documented_statuses_to_kinds() {
        let cases = [
            (400, ErrorKind::Validation),
            (401, ErrorKind::Auth),
            (403, ErrorKind::Permission),
            (404, ErrorKind::NotFound),
            (422, ErrorKind::Validation),
            (429, ErrorKind::RateLimit),
            (500, ErrorKind::Server),
            (503, ErrorKind::Server),
            (999, ErrorKind::Generic),
        ];
        for (code, kind) in cases {
            let err = classify_status(status(code), &HeaderMap::new(), None);
            assert_eq!(err.kind(), kind, "status {code}");
        }
    }

    #[test]
    fn missing_response_is_network() {
        let err = classify(&Err(TransportFailure::new("connect: refused")));
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.message_key(), NETWORK_KEY);
    }

    #[test]
    fn rate_limit_defaults_to_sixty_seconds() {
        let err = classify_status(status(429), &HeaderMap::new(), Some(&json!({})));
        match err {
            ApiError::RateLimit { retry_after, .. } => {
                assert_eq!(retry_after, Duration::from_secs(60))
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[test]
    fn rate_limit_prefers_body_then_header() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));

        let from_header = classify_status(status(429), &headers, None);
        assert!(matches!(
            from_header,
            ApiError::RateLimit { retry_after, .. } if retry_after == Duration::from_secs(30)
        ));

        let from_body = classify_status(status(429), &headers, Some(&json!({ "retryAfter": 5 })));
        assert!(matches!(
            from_body,
            ApiError::RateLimit { retry_after, .. } if retry_after == Duration::from_secs(5)
        ));
    }

    #[test]
    fn message_key_precedence() {
        let declared = classify_status(
            status(404),
            &HeaderMap::new(),
            Some(&json!({ "messageKey": "products.notFound", "message": "nope" })),
        );
        assert_eq!(declared.message_key(), "products.notFound");

        let from_table = classify_status(status(404), &HeaderMap::new(), Some(&json!({ "message": "nope" })));
        assert_eq!(from_table.message_key(), "errors.notFound");

        let from_message = classify_status(status(418), &HeaderMap::new(), Some(&json!({ "message": "teapot" })));
        assert_eq!(from_message.message_key(), "teapot");

        let unknown = classify_status(status(418), &HeaderMap::new(), None);
        assert_eq!(unknown.message_key(), UNKNOWN_KEY);
        assert_eq!(unknown.status(), Some(status(418)));
    }

    #[test]
    fn validation_collects_field_errors() {
        let body = json!({
            "messageKey": "customers.invalid",
            "errors": { "phone": "required", "email": ["invalid", "taken"] }
        });
        let resp = ApiResponse::new(status(422), HeaderMap::new(), body.to_string().into_bytes());
        match classify(&Ok(resp)) {
            ApiError::Validation { message_key, fields } => {
                assert_eq!(message_key, "customers.invalid");
                assert_eq!(fields["phone"], vec!["required".to_string()]);
                assert_eq!(fields["email"].len(), 2);
            }
            other => panic!("expected validation, got {other:?}"),
        }
    }

    #[test]
    fn server_errors_keep_status() {
        let err = classify_status(status(503), &HeaderMap::new(), None);
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(err.to_string(), "errors.serviceUnavailable");
    }
}
