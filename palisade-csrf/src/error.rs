use palisade_core::Error as CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsrfError {
    #[error("Invalid CSRF configuration: {0}")]
    Configuration(String),

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Secure random source unavailable: {0}")]
    Entropy(#[from] rand::Error),

    #[error("Invalid CSRF token")]
    InvalidToken,

    #[error("CSRF middleware is not installed for this request")]
    MissingContext,

    #[error("Token store error: {0}")]
    Store(String),

    #[error("Environment configuration error: {0}")]
    Env(String),
}

pub type Result<T> = std::result::Result<T, CsrfError>;

impl From<CsrfError> for CoreError {
    fn from(error: CsrfError) -> Self {
        match error {
            CsrfError::InvalidToken => CoreError::Forbidden(error.to_string()),
            CsrfError::NotImplemented(what) => CoreError::NotImplemented(what.to_string()),
            other => CoreError::Internal(other.to_string()),
        }
    }
}
