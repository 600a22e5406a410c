//! Admin endpoints over BuyForMe requests.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;

use super::{actor_id, parse_enum, AppError, AppState};
use crate::buyforme_actor::BuyForMeError;
use crate::domain::{BuyForMeQuery, BuyForMeRequest, RequestStatistics, RequestStatus, SubStatus};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests))
        .route("/statistics", get(statistics))
        .route("/:id", get(get_request))
        .route("/:id/status", patch(update_status))
        .route("/:id/notes", patch(update_notes))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub status: Option<String>,
    pub sub_status: Option<String>,
    pub customer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    pub status: String,
    pub sub_status: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesBody {
    pub admin_notes: String,
}

async fn list_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<BuyForMeRequest>>, AppError> {
    actor_id(&headers)?;
    let Query(params) = params?;
    let status = parse_enum::<RequestStatus>(params.status.as_deref())?;
    let sub_status = parse_enum::<SubStatus>(params.sub_status.as_deref())?;
    let requests = match (status, sub_status, params.customer_id) {
        (Some(status), sub_status, None) => state.requests.get_by_status(status, sub_status).await?,
        (None, None, Some(customer_id)) => state.requests.get_by_customer(&customer_id).await?,
        (status, sub_status, customer_id) => {
            let query = BuyForMeQuery {
                status,
                sub_status,
                customer_id,
                ..BuyForMeQuery::default()
            };
            state.requests.find_sorted(query).await?
        }
    };
    Ok(Json(requests))
}

async fn statistics(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<RequestStatistics>, AppError> {
    actor_id(&headers)?;
    Ok(Json(state.requests.get_statistics().await?))
}

async fn get_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BuyForMeRequest>, AppError> {
    actor_id(&headers)?;
    Ok(Json(state.requests.require(&id).await?))
}

async fn update_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<StatusBody>, JsonRejection>,
) -> Result<Json<BuyForMeRequest>, AppError> {
    let actor = actor_id(&headers)?;
    let Json(body) = body?;
    let status = body
        .status
        .parse::<RequestStatus>()
        .map_err(BuyForMeError::InvalidStatus)?;
    let sub_status = parse_enum::<SubStatus>(body.sub_status.as_deref())?;
    let request = state
        .requests
        .update_status(id, status, sub_status, actor, body.note)
        .await?;
    Ok(Json(request))
}

async fn update_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<NotesBody>, JsonRejection>,
) -> Result<Json<BuyForMeRequest>, AppError> {
    actor_id(&headers)?;
    let Json(body) = body?;
    Ok(Json(state.requests.update_admin_notes(id, body.admin_notes).await?))
}
