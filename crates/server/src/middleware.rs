use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use common::LogLevel;

use crate::errors::{ApiError, FailureRecord};
use crate::state::AppState;

/// Raw bearer token of an authorized request. Not verified here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme == "Bearer" && !token.is_empty()).then_some(token)
}

/// Rejects requests without `Authorization: Bearer <token>` before any
/// handler runs.
pub async fn require_bearer(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized("missing or malformed bearer token".into()))?;
    req.extensions_mut().insert(BearerToken(token));
    Ok(next.run(req).await)
}

const REJECTION_BODY_LIMIT: usize = 64 * 1024;

/// Re-wraps failed responses that did not come from an [`ApiError`], such as
/// timeouts, unmatched routes and framework rejections, in the envelope.
pub async fn envelope_bare_failures(req: Request, next: Next) -> Response {
    let resp = next.run(req).await;
    let status = resp.status();
    let failed = status.is_client_error() || status.is_server_error();
    if !failed || resp.extensions().get::<FailureRecord>().is_some() {
        return resp;
    }
    let message = to_bytes(resp.into_body(), REJECTION_BODY_LIMIT)
        .await
        .ok()
        .map(|b| String::from_utf8_lossy(&b).trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    ApiError::Rejected { status, message }.into_response()
}

/// Writes one `controller` operation-log entry for each failed request.
pub async fn record_failures(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let resp = next.run(req).await;
    if let Some(failure) = resp.extensions().get::<FailureRecord>() {
        let level = if resp.status().is_server_error() { LogLevel::Error } else { LogLevel::Warn };
        state.oplog.log(
            "controller",
            level,
            &format!("{}: {} ({} {})", failure.stage.as_str(), failure.message, method, path),
        );
    }
    resp
}
