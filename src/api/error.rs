use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::box_actor::BoxContentError;
use crate::buyforme_actor::BuyForMeError;
use crate::customer_actor::CustomerError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Missing {0} header")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(ref msg) => {
                error!(error = %msg, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<BuyForMeError> for AppError {
    fn from(err: BuyForMeError) -> Self {
        let msg = err.to_string();
        match err {
            BuyForMeError::NotFound(_) => AppError::NotFound(msg),
            BuyForMeError::InvalidCustomer(_) | BuyForMeError::ValidationError(_) | BuyForMeError::InvalidStatus(_) => {
                AppError::BadRequest(msg)
            }
            BuyForMeError::Forbidden(_) => AppError::Forbidden(msg),
            BuyForMeError::TransitionRejected(_) | BuyForMeError::DuplicateRequestNumber(_) => AppError::Conflict(msg),
            BuyForMeError::RequestNumberExhausted(_)
            | BuyForMeError::StorageError(_)
            | BuyForMeError::ActorCommunicationError(_) => AppError::Internal(msg),
        }
    }
}

impl From<BoxContentError> for AppError {
    fn from(err: BoxContentError) -> Self {
        let msg = err.to_string();
        match err {
            BoxContentError::NotFound(_) => AppError::NotFound(msg),
            BoxContentError::InvalidCustomer(_) | BoxContentError::ValidationError(_) => AppError::BadRequest(msg),
            BoxContentError::Forbidden(_) => AppError::Forbidden(msg),
            BoxContentError::InvalidTransition(_) => AppError::Conflict(msg),
            BoxContentError::StorageError(_) | BoxContentError::ActorCommunicationError(_) => AppError::Internal(msg),
        }
    }
}

impl From<CustomerError> for AppError {
    fn from(err: CustomerError) -> Self {
        let msg = err.to_string();
        match err {
            CustomerError::NotFound(_) => AppError::NotFound(msg),
            CustomerError::AlreadyExists(_) => AppError::Conflict(msg),
            CustomerError::ValidationError(_) => AppError::BadRequest(msg),
            CustomerError::StorageError(_) | CustomerError::ActorCommunicationError(_) => AppError::Internal(msg),
        }
    }
}
