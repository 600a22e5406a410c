use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during customer operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CustomerError {
    #[error("Customer not found: {0}")]
    NotFound(String),
    #[error("Customer already exists: {0}")]
    AlreadyExists(String),
    #[error("Customer validation error: {0}")]
    ValidationError(String),
    #[error("Customer storage error: {0}")]
    StorageError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for CustomerError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound(id) => Self::NotFound(id),
            FrameworkError::Conflict(key) => Self::AlreadyExists(key),
            FrameworkError::Invalid(msg) | FrameworkError::Rejected(msg) => Self::ValidationError(msg),
            FrameworkError::Storage(msg) => Self::StorageError(msg),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                Self::ActorCommunicationError(err.to_string())
            }
        }
    }
}
