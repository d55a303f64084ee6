//! Health check endpoint.

use crate::adapters::http::AppState;
use crate::shared::ServiceKind;
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Service name to whether it answered `ping`.
    pub services: BTreeMap<&'static str, bool>,
}

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut services = BTreeMap::new();
    for kind in ServiceKind::ALL {
        let up = match state.client(kind) {
            Ok(client) => client.ping().await.is_ok(),
            Err(_) => false,
        };
        services.insert(kind.name(), up);
    }
    let healthy = services.values().all(|up| *up);

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}
