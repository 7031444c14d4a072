use sea_orm::{DbErr, TransactionError};
use thiserror::Error;

use models::Violations;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(#[from] Violations),
    #[error("{0}")]
    NotFound(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {} not found", entity, id))
    }

    /// Stable short name for logs and envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Persistence(_) => "persistence",
            ServiceError::Connection(_) => "connection",
            ServiceError::Upstream(_) => "upstream",
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => ServiceError::Connection(err.to_string()),
            DbErr::RecordNotFound(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Persistence(other.to_string()),
        }
    }
}

/// Begin/commit failures surface as database errors; failures inside the
/// body are passed through untouched.
impl From<TransactionError<ServiceError>> for ServiceError {
    fn from(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Connection(db) => db.into(),
            TransactionError::Transaction(inner) => inner,
        }
    }
}
