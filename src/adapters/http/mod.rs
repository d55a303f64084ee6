//! HTTP/JSON gateway. Translates REST calls into message-pattern requests
//! against the microservices and maps their error codes onto HTTP statuses.

pub mod error;
pub mod routes;

pub use error::AppError;

use crate::adapters::transport::ServiceClient;
use crate::shared::{AppConfig, ServiceKind};
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    services: Arc<HashMap<ServiceKind, ServiceClient>>,
}

impl AppState {
    pub fn new(clients: impl IntoIterator<Item = (ServiceKind, ServiceClient)>) -> Self {
        Self {
            services: Arc::new(clients.into_iter().collect()),
        }
    }

    /// One client per service at the configured addresses.
    pub fn from_config(config: &AppConfig) -> Self {
        let timeout = config.request_timeout_or_default();
        Self::new(ServiceKind::ALL.into_iter().map(|kind| {
            (
                kind,
                ServiceClient::new(kind.name(), config.service_addr(kind), timeout),
            )
        }))
    }

    pub fn client(&self, kind: ServiceKind) -> Result<&ServiceClient, AppError> {
        self.services
            .get(&kind)
            .ok_or_else(|| AppError::Internal(format!("no client configured for {kind}")))
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::resources::routes())
        .merge(routes::actions::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
