//! Routes for operations that are not plain CRUD.

use super::{JsonBody, PathParams};
use crate::adapters::http::{AppError, AppState};
use crate::domain::EntityId;
use crate::shared::ServiceKind;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct StockBody {
    pub delta: f64,
}

/// A missing or null `staff_id` releases the vehicle.
#[derive(Debug, Default, Deserialize)]
pub struct AssignBody {
    #[serde(default)]
    pub staff_id: Option<EntityId>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/clients/:id/primary-address/:address_id",
            post(set_primary_address),
        )
        .route("/addresses/:id/reassign/:client_id", post(reassign_address))
        .route(
            "/projects/:id/tags/:tag_id",
            post(add_project_tag).delete(remove_project_tag),
        )
        .route("/projects/:id/hours", get(project_hours))
        .route("/materials/:id/stock", post(adjust_stock))
        .route("/vehicles/:id/assign", post(assign_vehicle))
}

async fn send(
    state: &AppState,
    kind: ServiceKind,
    cmd: &str,
    data: Value,
) -> Result<Json<Value>, AppError> {
    let reply = state.client(kind)?.send_value(cmd, data).await?;
    Ok(Json(reply))
}

async fn set_primary_address(
    State(state): State<AppState>,
    ids: PathParams<(EntityId, EntityId)>,
) -> Result<Json<Value>, AppError> {
    let Path((client_id, address_id)) = ids?;
    let data = json!({ "client_id": client_id, "address_id": address_id });
    send(&state, ServiceKind::Clients, "set_primary_address", data).await
}

async fn reassign_address(
    State(state): State<AppState>,
    ids: PathParams<(EntityId, EntityId)>,
) -> Result<Json<Value>, AppError> {
    let Path((address_id, client_id)) = ids?;
    let data = json!({ "address_id": address_id, "client_id": client_id });
    send(&state, ServiceKind::Clients, "reassign_address", data).await
}

async fn add_project_tag(
    State(state): State<AppState>,
    ids: PathParams<(EntityId, EntityId)>,
) -> Result<Json<Value>, AppError> {
    let Path((project_id, tag_id)) = ids?;
    let data = json!({ "project_id": project_id, "tag_id": tag_id });
    send(&state, ServiceKind::Projects, "add_project_tag", data).await
}

async fn remove_project_tag(
    State(state): State<AppState>,
    ids: PathParams<(EntityId, EntityId)>,
) -> Result<Json<Value>, AppError> {
    let Path((project_id, tag_id)) = ids?;
    let data = json!({ "project_id": project_id, "tag_id": tag_id });
    let Json(removed) = send(&state, ServiceKind::Projects, "remove_project_tag", data).await?;
    Ok(Json(json!({ "deleted": removed })))
}

async fn project_hours(
    State(state): State<AppState>,
    id: PathParams<EntityId>,
) -> Result<Json<Value>, AppError> {
    let Path(project_id) = id?;
    let data = json!({ "project_id": project_id });
    send(&state, ServiceKind::Planning, "get_project_hours", data).await
}

async fn adjust_stock(
    State(state): State<AppState>,
    id: PathParams<EntityId>,
    body: JsonBody<StockBody>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let data = json!({ "id": id, "delta": body.delta });
    send(&state, ServiceKind::Resources, "adjust_material_stock", data).await
}

async fn assign_vehicle(
    State(state): State<AppState>,
    id: PathParams<EntityId>,
    body: JsonBody<AssignBody>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let data = json!({ "id": id, "staff_id": body.staff_id });
    send(&state, ServiceKind::Resources, "assign_vehicle", data).await
}
