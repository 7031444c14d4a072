use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::Violations;
use service::ServiceError;
use thiserror::Error;

use crate::envelope::{Envelope, ErrorBody, Stage};

/// Every way a request can fail, tagged with the stage it failed in.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    Parse(String),
    #[error("{0}")]
    Validate(Violations),
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// Failure produced outside the handlers, such as a timeout or an
    /// unmatched route.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

/// Attached to failed responses so the failure can be reported once, by
/// [`crate::middleware::record_failures`], whichever layer produced it.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub stage: Stage,
    pub message: String,
}

impl ApiError {
    pub fn stage(&self) -> Stage {
        match self {
            ApiError::Unauthorized(_) => Stage::Auth,
            ApiError::Parse(_) => Stage::Parse,
            ApiError::Validate(_) => Stage::Validate,
            ApiError::Service(_) => Stage::Service,
            ApiError::Rejected { status, .. } => {
                if *status == StatusCode::REQUEST_TIMEOUT || status.is_server_error() {
                    Stage::Service
                } else {
                    Stage::Parse
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Parse(_) | ApiError::Validate(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) => match err {
                ServiceError::Validation(_) | ServiceError::NotFound(_) => StatusCode::BAD_REQUEST,
                ServiceError::Persistence(_) | ServiceError::Connection(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
            },
            ApiError::Rejected { status, .. } => *status,
        }
    }

    fn violations(&self) -> Option<Violations> {
        match self {
            ApiError::Validate(v) | ApiError::Service(ServiceError::Validation(v)) => Some(v.clone()),
            _ => None,
        }
    }
}

impl From<Violations> for ApiError {
    fn from(v: Violations) -> Self {
        ApiError::Validate(v)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let record = FailureRecord { stage: self.stage(), message: self.to_string() };
        let body = ErrorBody { stage: record.stage, message: record.message.clone(), violations: self.violations() };
        let mut resp = (status, Json(Envelope::failure(status, body))).into_response();
        resp.extensions_mut().insert(record);
        resp
    }
}
