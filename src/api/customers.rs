use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::{AppError, AppState};
use crate::domain::{Customer, CustomerPatch};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(register))
        .route("/:id", get(get_customer).patch(update_customer))
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
}

async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let Json(body) = body?;
    let customer = state.customers.register(body.name, body.email).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn get_customer(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Customer>, AppError> {
    Ok(Json(state.customers.require(&id).await?))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<CustomerPatch>, JsonRejection>,
) -> Result<Json<Customer>, AppError> {
    let Json(patch) = body?;
    Ok(Json(state.customers.update_customer(id, patch).await?))
}
