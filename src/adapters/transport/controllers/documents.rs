use super::{decode, encode, id_of, list_query};
use crate::domain::DomainError;
use crate::ports::MessageHandler;
use crate::usecases::DocumentService;
use serde_json::Value;
use std::sync::Arc;

const PATTERNS: &[&str] = &[
    "get_all_documents",
    "get_document",
    "create_document",
    "update_document",
    "delete_document",
];

pub struct DocumentController {
    service: Arc<DocumentService>,
}

impl DocumentController {
    pub fn new(service: Arc<DocumentService>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl MessageHandler for DocumentController {
    fn service(&self) -> &'static str {
        "documents"
    }

    fn patterns(&self) -> &'static [&'static str] {
        PATTERNS
    }

    async fn handle(&self, cmd: &str, data: Value) -> Result<Value, DomainError> {
        let svc = &self.service;
        match cmd {
            "get_all_documents" => encode(&svc.get_all_documents(&list_query(data)?).await?),
            "get_document" => encode(&svc.get_document(id_of(data)?).await?),
            "create_document" => encode(&svc.create_document(&decode(data)?).await?),
            "update_document" => encode(&svc.update_document(&decode(data)?).await?),
            "delete_document" => encode(&svc.delete_document(id_of(data)?).await?),
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

    #[tokio::test]
    async fn partial_update_over_patterns() {
        let (repo, _dir) = repo().await;
        let service = DocumentService::new(Arc::new(repo), PageLimits::default());
        let ctl = DocumentController::new(Arc::new(service));

        let doc = ctl
            .handle(
                "create_document",
                json!({"title": "Contract", "kind": "contract", "issued_on": "2024-02-29"}),
            )
            .await
            .unwrap();
        assert_eq!(doc["kind"], "contract");

        let updated = ctl
            .handle("update_document", json!({"id": doc["id"], "amount": 990.5}))
            .await
            .unwrap();
        assert_eq!(updated["amount"], 990.5);
        assert_eq!(updated["issued_on"], "2024-02-29");
        assert_eq!(updated["title"], "Contract");

        let missing = ctl
            .handle("update_document", json!({"id": 404, "title": "x"}))
            .await
            .unwrap_err();
        assert_eq!(missing.code(), "NOT_FOUND");
    }
}
