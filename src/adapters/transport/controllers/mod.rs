//! Message-pattern controllers. Each maps `{cmd}` routing keys of one
//! microservice onto its use-case service.

mod clients;
mod documents;
mod planning;
mod projects;
mod resources;

pub use clients::ClientController;
pub use documents::DocumentController;
pub use planning::PlanningController;
pub use projects::ProjectController;
pub use resources::ResourceController;

use crate::adapters::persistence::SqliteRepo;
use crate::domain::{DomainError, EntityId, IdPayload, ListQuery};
use crate::ports::MessageHandler;
use crate::shared::ServiceKind;
use crate::usecases::{
    ClientService, DocumentService, PageLimits, PlanningService, ProjectService, ResourceService,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Builds the use-case service and controller of one microservice over the shared store.
pub fn controller(
    kind: ServiceKind,
    repo: Arc<SqliteRepo>,
    limits: PageLimits,
) -> Arc<dyn MessageHandler> {
    match kind {
        ServiceKind::Clients => {
            Arc::new(ClientController::new(Arc::new(ClientService::new(repo, limits))))
        }
        ServiceKind::Projects => {
            Arc::new(ProjectController::new(Arc::new(ProjectService::new(repo, limits))))
        }
        ServiceKind::Resources => {
            Arc::new(ResourceController::new(Arc::new(ResourceService::new(repo, limits))))
        }
        ServiceKind::Planning => {
            Arc::new(PlanningController::new(Arc::new(PlanningService::new(repo, limits))))
        }
        ServiceKind::Documents => {
            Arc::new(DocumentController::new(Arc::new(DocumentService::new(repo, limits))))
        }
    }
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T, DomainError> {
    Ok(serde_json::from_value(data)?)
}

/// A missing payload is an unfiltered first page.
fn list_query(data: Value) -> Result<ListQuery, DomainError> {
    if data.is_null() {
        return Ok(ListQuery::default());
    }
    decode(data)
}

fn id_of(data: Value) -> Result<EntityId, DomainError> {
    decode::<IdPayload>(data).map(IdPayload::id)
}

fn encode<T: Serialize>(value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::Repo(format!("encode reply: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_accept_bare_and_wrapped_forms() {
        assert_eq!(id_of(json!(7)).unwrap(), 7);
        assert_eq!(id_of(json!({"id": 8})).unwrap(), 8);
        assert_eq!(id_of(json!("x")).unwrap_err().code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn controller_matches_service_kind() {
        let (repo, _dir) = crate::adapters::persistence::sqlite_repo::test_support::repo().await;
        let repo = Arc::new(repo);
        for kind in ServiceKind::ALL {
            let handler = controller(kind, Arc::clone(&repo), PageLimits::default());
            assert_eq!(handler.service(), kind.name());
        }
    }

    #[test]
    fn null_list_payload_is_default_query() {
        assert_eq!(list_query(Value::Null).unwrap(), ListQuery::default());
        let q = list_query(json!({"search": "oak", "page": 2})).unwrap();
        assert_eq!(q.search_term(), Some("oak"));
        assert_eq!(q.page, Some(2));
    }
}
