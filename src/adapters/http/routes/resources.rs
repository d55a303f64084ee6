//! CRUD routes. Every resource path maps onto the `get_all_*`, `get_*`,
//! `create_*`, `update_*` and `delete_*` patterns of its microservice.

use super::{JsonBody, PathParams, QueryParams};
use crate::adapters::http::{AppError, AppState};
use crate::domain::{EntityId, ListQuery};
use crate::shared::ServiceKind;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};

/// A REST collection backed by one entity of one microservice.
#[derive(Debug)]
pub struct Resource {
    pub path: &'static str,
    pub service: ServiceKind,
    /// Pattern suffix for single-entity commands (`get_client`).
    pub one: &'static str,
    /// Pattern suffix for listing (`get_all_clients`).
    pub many: &'static str,
}

pub const RESOURCES: &[Resource] = &[
    Resource::new("clients", ServiceKind::Clients, "client", "clients"),
    Resource::new("addresses", ServiceKind::Clients, "address", "addresses"),
    Resource::new("projects", ServiceKind::Projects, "project", "projects"),
    Resource::new("stages", ServiceKind::Projects, "stage", "stages"),
    Resource::new("tasks", ServiceKind::Projects, "task", "tasks"),
    Resource::new("tags", ServiceKind::Projects, "tag", "tags"),
    Resource::new("staff", ServiceKind::Resources, "staff", "staff"),
    Resource::new("materials", ServiceKind::Resources, "material", "materials"),
    Resource::new("vehicles", ServiceKind::Resources, "vehicle", "vehicles"),
    Resource::new("events", ServiceKind::Planning, "event", "events"),
    Resource::new("time-logs", ServiceKind::Planning, "time_log", "time_logs"),
    Resource::new("documents", ServiceKind::Documents, "document", "documents"),
];

impl Resource {
    const fn new(
        path: &'static str,
        service: ServiceKind,
        one: &'static str,
        many: &'static str,
    ) -> Self {
        Self {
            path,
            service,
            one,
            many,
        }
    }
}

pub fn routes() -> Router<AppState> {
    RESOURCES.iter().fold(Router::new(), |router, r| {
        router
            .route(
                &format!("/{}", r.path),
                get(move |state: State<AppState>, query: QueryParams<ListQuery>| {
                    list(r, state, query)
                })
                .post(move |state: State<AppState>, body: JsonBody<Value>| {
                    create(r, state, body)
                }),
            )
            .route(
                &format!("/{}/:id", r.path),
                get(move |state: State<AppState>, id: PathParams<EntityId>| {
                    fetch(r, state, id)
                })
                .patch(
                    move |state: State<AppState>, id: PathParams<EntityId>, body: JsonBody<Value>| {
                        update(r, state, id, body)
                    },
                )
                .put(
                    move |state: State<AppState>, id: PathParams<EntityId>, body: JsonBody<Value>| {
                        update(r, state, id, body)
                    },
                )
                .delete(move |state: State<AppState>, id: PathParams<EntityId>| {
                    remove(r, state, id)
                }),
            )
    })
}

async fn list(
    r: &'static Resource,
    State(state): State<AppState>,
    query: QueryParams<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let Query(query) = query?;
    let data = serde_json::to_value(&query)?;
    let page = state
        .client(r.service)?
        .send_value(&format!("get_all_{}", r.many), data)
        .await?;
    Ok(Json(page))
}

async fn fetch(
    r: &'static Resource,
    State(state): State<AppState>,
    id: PathParams<EntityId>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let entity = state
        .client(r.service)?
        .send_value(&format!("get_{}", r.one), json!({ "id": id }))
        .await?;
    Ok(Json(entity))
}

async fn create(
    r: &'static Resource,
    State(state): State<AppState>,
    body: JsonBody<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(body) = body?;
    let created = state
        .client(r.service)?
        .send_value(&format!("create_{}", r.one), body)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    r: &'static Resource,
    State(state): State<AppState>,
    id: PathParams<EntityId>,
    body: JsonBody<Value>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let Value::Object(mut fields) = body else {
        return Err(AppError::BadRequest("update body must be a JSON object".into()));
    };
    fields.insert("id".into(), json!(id));
    let updated = state
        .client(r.service)?
        .send_value(&format!("update_{}", r.one), Value::Object(fields))
        .await?;
    Ok(Json(updated))
}

async fn remove(
    r: &'static Resource,
    State(state): State<AppState>,
    id: PathParams<EntityId>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let deleted = state
        .client(r.service)?
        .send_value(&format!("delete_{}", r.one), json!({ "id": id }))
        .await?;
    Ok(Json(json!({ "deleted": deleted })))
}
