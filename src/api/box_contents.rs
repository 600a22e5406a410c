//! Warehouse endpoints for staff plus the customer's view of their box.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{actor_id, customer_id, parse_enum, AppError, AppState};
use crate::domain::{BoxContent, BoxContentCreate, BoxContentPatch, BoxStatus, BoxSummary, ItemCondition};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(arrive))
        .route("/:id", get(get_item).patch(update_item))
        .route("/:id/inspect", post(inspect))
        .route("/:id/ready", post(mark_ready))
        .route("/:id/pack", post(pack))
        .route("/:id/ship", post(ship))
        .route("/:id/deliver", post(deliver))
        .route("/:id/return", post(return_item))
        .route("/:id/dispose", post(dispose))
        .route("/user/:customer_id", get(list_for_customer))
        .route("/user/:customer_id/summary", get(summary))
        .route("/user/:customer_id/:item_id/request-packing", post(request_packing))
        .route("/user/:customer_id/:item_id/confirm-packing", post(confirm_packing))
}

#[derive(Debug, Deserialize)]
pub struct InspectBody {
    pub condition: ItemCondition,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackBody {
    pub package_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipBody {
    pub carrier: String,
    pub tracking_number: String,
}

#[derive(Debug, Deserialize)]
pub struct ReasonBody {
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FlagResponse {
    pub changed: bool,
    pub item: BoxContent,
}

/// Staff may read any customer's box; a customer only their own.
fn authorize_box_reader(headers: &HeaderMap, owner: &str) -> Result<(), AppError> {
    if actor_id(headers).is_ok() {
        return Ok(());
    }
    let caller = customer_id(headers)?;
    if caller != owner {
        return Err(AppError::Forbidden(format!("Box of {owner} is not yours")));
    }
    Ok(())
}

async fn arrive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<BoxContentCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<BoxContent>), AppError> {
    let staff = actor_id(&headers)?;
    let Json(mut params) = body?;
    if params.received_by.is_empty() {
        params.received_by = staff;
    }
    let item = state.boxes.arrive(params).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BoxContent>, AppError> {
    let item = state.boxes.require(&id).await?;
    authorize_box_reader(&headers, &item.customer_id)?;
    Ok(Json(item))
}

async fn update_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<BoxContentPatch>, JsonRejection>,
) -> Result<Json<BoxContent>, AppError> {
    actor_id(&headers)?;
    let Json(patch) = body?;
    Ok(Json(state.boxes.update_item(id, patch).await?))
}

async fn inspect(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<InspectBody>, JsonRejection>,
) -> Result<Json<BoxContent>, AppError> {
    let staff = actor_id(&headers)?;
    let Json(body) = body?;
    let item = state
        .boxes
        .inspect(id, staff, body.condition, body.notes, body.photos)
        .await?;
    Ok(Json(item))
}

async fn mark_ready(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BoxContent>, AppError> {
    let staff = actor_id(&headers)?;
    Ok(Json(state.boxes.mark_ready_for_packing(id, staff).await?))
}

async fn pack(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Option<Json<PackBody>>,
) -> Result<Json<BoxContent>, AppError> {
    let staff = actor_id(&headers)?;
    let reference = body.and_then(|Json(body)| body.package_reference);
    Ok(Json(state.boxes.pack(id, staff, reference).await?))
}

async fn ship(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<ShipBody>, JsonRejection>,
) -> Result<Json<BoxContent>, AppError> {
    actor_id(&headers)?;
    let Json(body) = body?;
    Ok(Json(state.boxes.ship(id, body.carrier, body.tracking_number).await?))
}

async fn deliver(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BoxContent>, AppError> {
    actor_id(&headers)?;
    Ok(Json(state.boxes.deliver(id).await?))
}

async fn return_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<ReasonBody>, JsonRejection>,
) -> Result<Json<BoxContent>, AppError> {
    let staff = actor_id(&headers)?;
    let Json(body) = body?;
    Ok(Json(state.boxes.return_item(id, body.reason, staff).await?))
}

async fn dispose(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<ReasonBody>, JsonRejection>,
) -> Result<Json<BoxContent>, AppError> {
    let staff = actor_id(&headers)?;
    let Json(body) = body?;
    Ok(Json(state.boxes.dispose(id, body.reason, staff).await?))
}

async fn list_for_customer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(owner): Path<String>,
    filter: Result<Query<StatusFilter>, QueryRejection>,
) -> Result<Json<Vec<BoxContent>>, AppError> {
    authorize_box_reader(&headers, &owner)?;
    let Query(filter) = filter?;
    let status = parse_enum::<BoxStatus>(filter.status.as_deref())?;
    Ok(Json(state.boxes.contents_for_customer(&owner, status).await?))
}

async fn summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(owner): Path<String>,
) -> Result<Json<BoxSummary>, AppError> {
    authorize_box_reader(&headers, &owner)?;
    Ok(Json(state.boxes.summary(&owner).await?))
}

/// The path owner must be the calling customer.
fn require_owner(headers: &HeaderMap, owner: &str) -> Result<(), AppError> {
    let caller = customer_id(headers)?;
    if caller != owner {
        return Err(AppError::Forbidden(format!("Box of {owner} is not yours")));
    }
    Ok(())
}

async fn request_packing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((owner, item_id)): Path<(String, String)>,
) -> Result<Json<FlagResponse>, AppError> {
    require_owner(&headers, &owner)?;
    let (item, changed) = state.boxes.request_packing(&owner, &item_id).await?;
    Ok(Json(FlagResponse { changed, item }))
}

async fn confirm_packing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((owner, item_id)): Path<(String, String)>,
) -> Result<Json<FlagResponse>, AppError> {
    require_owner(&headers, &owner)?;
    let (item, changed) = state.boxes.confirm_packing(&owner, &item_id).await?;
    Ok(Json(FlagResponse { changed, item }))
}
