use similarity::IndexError;
use thiserror::Error;

/// Errors returned by the query and recommendation services
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("'{0}' not found")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Index(#[from] IndexError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
