// Error types shared by Palisade middleware and handlers

use crate::HttpResponse;
use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Not Implemented: {0}")]
    NotImplemented(String),
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        let status = match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Error::Http(_) | Error::Serialization(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        status.as_u16()
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Render the error as a bare response carrying only its status.
    ///
    /// The message is not copied into the body; callers that want to expose
    /// it must do so explicitly.
    pub fn to_response(&self) -> HttpResponse {
        HttpResponse::new(self.status_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Forbidden("x".into()).status_code(), 403);
        assert_eq!(Error::BadRequest("x".into()).status_code(), 400);
        assert_eq!(Error::Internal("x".into()).status_code(), 500);
        assert_eq!(Error::NotImplemented("x".into()).status_code(), 501);
    }

    #[test]
    fn test_error_classes() {
        assert!(Error::Forbidden("x".into()).is_client_error());
        assert!(!Error::Forbidden("x".into()).is_server_error());
        assert!(Error::Internal("x".into()).is_server_error());
    }

    #[test]
    fn test_to_response_has_no_body() {
        let response = Error::Forbidden("token mismatch".into()).to_response();
        assert_eq!(response.status, 403);
        assert!(response.body.is_empty());
    }
}
