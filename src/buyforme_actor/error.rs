use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuyForMeError {
    #[error("BuyForMe request not found: {0}")]
    NotFound(String),
    #[error("Invalid customer: {0}")]
    InvalidCustomer(String),
    #[error("Request validation error: {0}")]
    ValidationError(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Transition rejected: {0}")]
    TransitionRejected(String),
    #[error("Request belongs to another customer: {0}")]
    Forbidden(String),
    #[error("Duplicate request number: {0}")]
    DuplicateRequestNumber(String),
    #[error("Could not generate a unique request number after {0} attempts")]
    RequestNumberExhausted(usize),
    #[error("Request storage error: {0}")]
    StorageError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for BuyForMeError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound(id) => Self::NotFound(id),
            FrameworkError::Invalid(msg) => Self::ValidationError(msg),
            FrameworkError::Rejected(msg) => Self::TransitionRejected(msg),
            FrameworkError::Conflict(number) => Self::DuplicateRequestNumber(number),
            FrameworkError::Storage(msg) => Self::StorageError(msg),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                Self::ActorCommunicationError(err.to_string())
            }
        }
    }
}
