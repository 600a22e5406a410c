use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during box-content operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BoxContentError {
    #[error("Box item not found: {0}")]
    NotFound(String),
    #[error("Invalid customer: {0}")]
    InvalidCustomer(String),
    #[error("Box item validation error: {0}")]
    ValidationError(String),
    #[error("Invalid box transition: {0}")]
    InvalidTransition(String),
    #[error("Box item belongs to another customer: {0}")]
    Forbidden(String),
    #[error("Box storage error: {0}")]
    StorageError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for BoxContentError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound(id) => Self::NotFound(id),
            FrameworkError::Invalid(msg) | FrameworkError::Conflict(msg) => Self::ValidationError(msg),
            FrameworkError::Rejected(msg) => Self::InvalidTransition(msg),
            FrameworkError::Storage(msg) => Self::StorageError(msg),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                Self::ActorCommunicationError(err.to_string())
            }
        }
    }
}
