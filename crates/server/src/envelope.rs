//! One response shape for every outcome:
//! `{status_code, status_text, data, error?}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::Violations;
use serde::Serialize;

/// Where in request handling a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Auth,
    Parse,
    Validate,
    Service,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Auth => "auth",
            Stage::Parse => "parse",
            Stage::Validate => "validate",
            Stage::Service => "service",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub stage: Stage,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Violations>,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status_code: u16,
    pub status_text: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(status: StatusCode, data: T) -> Self {
        Self { status_code: status.as_u16(), status_text: status_text(status), data: Some(data), error: None }
    }
}

impl Envelope<()> {
    pub fn failure(status: StatusCode, error: ErrorBody) -> Self {
        Self { status_code: status.as_u16(), status_text: status_text(status), data: None, error: Some(error) }
    }
}

/// Success response carrying `data` inside the envelope.
pub fn respond<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(Envelope::ok(status, data))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_has_no_error_key() {
        let v = serde_json::to_value(Envelope::ok(StatusCode::CREATED, json!({"id": 1}))).unwrap();
        assert_eq!(v, json!({"status_code": 201, "status_text": "Created", "data": {"id": 1}}));
    }

    #[test]
    fn failure_has_null_data() {
        let body = ErrorBody { stage: Stage::Parse, message: "invalid price".into(), violations: None };
        let v = serde_json::to_value(Envelope::failure(StatusCode::BAD_REQUEST, body)).unwrap();
        assert_eq!(v["data"], serde_json::Value::Null);
        assert_eq!(v["error"], json!({"stage": "parse", "message": "invalid price"}));
        assert_eq!(v["status_text"], "Bad Request");
    }
}
