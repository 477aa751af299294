use thiserror::Error;

/// Failure taxonomy for dispatch operations.
///
/// `AuthFailed` deliberately carries no detail about which factor failed,
/// and `Storage` does not distinguish a uniqueness violation from any other
/// persistence fault beyond the `Conflict` case the store can classify.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("authentication failed")]
    AuthFailed,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for DispatchError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DispatchError::NotFound("row not found".to_string()),
            other => DispatchError::Storage(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
