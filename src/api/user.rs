//! Customer-facing BuyForMe endpoints. The caller is identified by `x-customer-id`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::{customer_id, AppError, AppState};
use crate::domain::{BuyForMeRequest, LineItem};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit).get(list_own))
        .route("/:id", get(get_own))
        .route("/:id/cancel", post(cancel))
        .route("/:id/notes", patch(update_notes))
}

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    pub items: Vec<LineItem>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelBody {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesBody {
    pub customer_notes: String,
}

async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SubmitBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<BuyForMeRequest>>), AppError> {
    let customer = customer_id(&headers)?;
    let Json(body) = body?;
    let created = state.requests.submit(customer, body.items, body.notes).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_own(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Vec<BuyForMeRequest>>, AppError> {
    let customer = customer_id(&headers)?;
    Ok(Json(state.requests.get_by_customer(&customer).await?))
}

async fn get_own(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BuyForMeRequest>, AppError> {
    let customer = customer_id(&headers)?;
    Ok(Json(state.requests.get_for_customer(&id, &customer).await?))
}

/// The body is optional; an absent or unreadable one means no reason was given.
async fn cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Option<Json<CancelBody>>,
) -> Result<Json<BuyForMeRequest>, AppError> {
    let customer = customer_id(&headers)?;
    let reason = body.and_then(|Json(body)| body.reason);
    Ok(Json(state.requests.cancel(id, customer, reason).await?))
}

async fn update_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<NotesBody>, JsonRejection>,
) -> Result<Json<BuyForMeRequest>, AppError> {
    let customer = customer_id(&headers)?;
    let Json(body) = body?;
    Ok(Json(
        state
            .requests
            .update_customer_notes(id, customer, body.customer_notes)
            .await?,
    ))
}
