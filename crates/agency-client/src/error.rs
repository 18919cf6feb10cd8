//! Error types for the REST client

use thiserror::Error;

use crate::resources::{Operation, Resource};

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered 401; the session has already been cleared
    #[error("Unauthorized: session expired or invalid")]
    Unauthorized,

    /// Any other non-success status
    #[error("API returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// The response envelope reported `success: false`
    #[error("Request rejected: {message}")]
    Rejected {
        /// Envelope message
        message: String,
    },

    /// The resource does not support the operation
    #[error("{operation} is not supported for {resource}")]
    Unsupported {
        /// Resource involved
        resource: Resource,
        /// Operation attempted
        operation: Operation,
    },

    /// The response body had an unexpected shape
    #[error("Unexpected response shape: expected {expected}")]
    UnexpectedShape {
        /// What was expected
        expected: &'static str,
    },

    /// The login form failed validation or the identity provider refused it
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// No record with the given identifier
    #[error("Record not found: {id}")]
    NotFound {
        /// Identifier that was looked up
        id: String,
    },

    /// JSON decoding failure
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Session storage failure or record parse failure
    #[error(transparent)]
    Core(#[from] agency_core::Error),
}

impl ClientError {
    /// Whether this failure was an authorization failure
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_messages() {
        let error = ClientError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(error.to_string(), "API returned 500: boom");

        let error = ClientError::Unsupported {
            resource: Resource::Reviews,
            operation: Operation::Update,
        };
        assert_eq!(error.to_string(), "update is not supported for reviews");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ClientError::Unauthorized.is_unauthorized());
        assert!(
            !ClientError::Rejected {
                message: "x".to_string()
            }
            .is_unauthorized()
        );
    }
}
