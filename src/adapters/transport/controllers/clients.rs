use super::{decode, encode, id_of, list_query};
use crate::domain::DomainError;
use crate::ports::MessageHandler;
use crate::usecases::ClientService;
use serde_json::Value;
use std::sync::Arc;

const PATTERNS: &[&str] = &[
    "get_all_clients",
    "get_client",
    "create_client",
    "update_client",
    "delete_client",
    "get_all_addresses",
    "get_address",
    "create_address",
    "update_address",
    "delete_address",
    "set_primary_address",
    "reassign_address",
];

pub struct ClientController {
    service: Arc<ClientService>,
}

impl ClientController {
    pub fn new(service: Arc<ClientService>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl MessageHandler for ClientController {
    fn service(&self) -> &'static str {
        "clients"
    }

    fn patterns(&self) -> &'static [&'static str] {
        PATTERNS
    }

    async fn handle(&self, cmd: &str, data: Value) -> Result<Value, DomainError> {
        let svc = &self.service;
        match cmd {
            "get_all_clients" => encode(&svc.get_all_clients(&list_query(data)?).await?),
            "get_client" => encode(&svc.get_client(id_of(data)?).await?),
            "create_client" => encode(&svc.create_client(&decode(data)?).await?),
            "update_client" => encode(&svc.update_client(&decode(data)?).await?),
            "delete_client" => encode(&svc.delete_client(id_of(data)?).await?),
            "get_all_addresses" => encode(&svc.get_all_addresses(&list_query(data)?).await?),
            "get_address" => encode(&svc.get_address(id_of(data)?).await?),
            "create_address" => encode(&svc.create_address(&decode(data)?).await?),
            "update_address" => encode(&svc.update_address(&decode(data)?).await?),
            "delete_address" => encode(&svc.delete_address(id_of(data)?).await?),
            "set_primary_address" => encode(&svc.set_primary_address(&decode(data)?).await?),
            "reassign_address" => encode(&svc.reassign_address(&decode(data)?).await?),
            other => Err(DomainError::UnknownPattern(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::sqlite_repo::test_support::repo;
    use crate::usecases::PageLimits;
    use serde_json::json;
    use tempfile::TempDir;

    async fn controller() -> (ClientController, TempDir) {
        let (repo, dir) = repo().await;
        let service = ClientService::new(Arc::new(repo), PageLimits::default());
        (ClientController::new(Arc::new(service)), dir)
    }

    #[tokio::test]
    async fn create_then_get_with_addresses() {
        let (ctl, _dir) = controller().await;
        let created = ctl
            .handle(
                "create_client",
                json!({
                    "name": "Nordic Builders",
                    "email": "hi@nordic.test",
                    "addresses": [{"street": "Fjordveien 2", "city": "Bergen", "is_primary": true}]
                }),
            )
            .await
            .unwrap();
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["addresses"][0]["is_primary"], true);

        let fetched = ctl.handle("get_client", json!({"id": id})).await.unwrap();
        assert_eq!(fetched, created);
        let fetched = ctl.handle("get_client", json!(id)).await.unwrap();
        assert_eq!(fetched["name"], "Nordic Builders");
    }

    #[tokio::test]
    async fn list_pages_and_delete() {
        let (ctl, _dir) = controller().await;
        for name in ["Ada", "Bea", "Cid"] {
            ctl.handle("create_client", json!({"name": name})).await.unwrap();
        }
        let page = ctl
            .handle("get_all_clients", json!({"limit": 2}))
            .await
            .unwrap();
        assert_eq!(page["total"], 3);
        assert_eq!(page["items"].as_array().unwrap().len(), 2);

        let first = page["items"][0]["id"].clone();
        assert_eq!(ctl.handle("delete_client", first.clone()).await.unwrap(), json!(true));
        assert_eq!(ctl.handle("delete_client", first.clone()).await.unwrap(), json!(false));
        let err = ctl.handle("get_client", first).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn bad_payload_and_unknown_pattern() {
        let (ctl, _dir) = controller().await;
        let err = ctl
            .handle("create_client", json!({"email": "no-name@x"}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");

        let err = ctl.handle("drop_tables", Value::Null).await.unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_PATTERN");
        assert!(!ctl.patterns().contains(&"drop_tables"));
    }
}
