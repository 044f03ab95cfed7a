use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[source] DbErr),
}

pub type HubResult<T> = Result<T, HubError>;

impl HubError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        HubError::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        HubError::Validation(message.into())
    }
}

/// Unique-index violations map to `Conflict`; anything else stays a
/// database error.
impl From<DbErr> for HubError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                HubError::Conflict(format!("record already exists: {detail}"))
            }
            _ => HubError::Database(err),
        }
    }
}
