//! Error types for the dashboard layer

use agency_client::ClientError;
use thiserror::Error;

/// Result type alias for dashboard operations
pub type AdminResult<T> = Result<T, AdminError>;

/// Errors surfaced by controllers, forms and triage lists
#[derive(Error, Debug)]
pub enum AdminError {
    /// Backend call failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A form failed client-side validation; nothing was sent
    #[error("Validation error in {field}: {message}")]
    Validation {
        /// Offending field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// No record with the given identifier is loaded
    #[error("Record not found: {id}")]
    RecordNotFound {
        /// Identifier that was looked up
        id: String,
    },

    /// `confirm_delete` without a preceding `request_delete`
    #[error("No delete is awaiting confirmation")]
    NoPendingDelete,

    /// Save pressed while no editor is open
    #[error("The editor is not open")]
    ModalClosed,

    /// Configuration, storage or parsing failure
    #[error(transparent)]
    Core(#[from] agency_core::Error),
}

impl AdminError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the backend rejected the session
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Client(ClientError::Unauthorized))
    }

    /// Message suitable for a banner or status dialog
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(
                ClientError::Status { message, .. } | ClientError::Rejected { message },
            ) => message.clone(),
            Self::Client(ClientError::Unauthorized) => {
                "Your session has expired. Please sign in again.".to_string()
            }
            Self::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
