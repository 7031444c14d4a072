//! Request body and path extraction.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ApiError;

/// Body accepted either as JSON or as an urlencoded form, chosen by
/// `Content-Type`. Anything else is a parse failure.
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Parse(e.body_text()))?;
            Ok(Payload(value))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Parse(e.body_text()))?;
            Ok(Payload(value))
        } else {
            Err(ApiError::Parse(format!("unsupported content type {content_type:?}")))
        }
    }
}

/// Integer field that may arrive as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberField {
    Int(i64),
    Text(String),
    Other(serde_json::Value),
}

impl NumberField {
    /// Missing, fractional or non-numeric input is reported as `invalid <field>`.
    pub fn parse(field: &str, value: Option<&NumberField>) -> Result<i64, ApiError> {
        let invalid = || ApiError::Parse(format!("invalid {field}"));
        match value {
            Some(NumberField::Int(n)) => Ok(*n),
            Some(NumberField::Text(s)) => s.trim().parse::<i64>().map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

/// `:id` path segment parsed as a UUID. A segment that cannot be decoded is a
/// parse failure; one that decodes but is not a UUID is a validation failure.
pub struct PathId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Parse(e.body_text()))?;
        parse_id(&raw).map(PathId)
    }
}

pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        ApiError::Validate(models::Violations::single("id", format!("{raw:?} is not a valid UUID")))
    })
}
