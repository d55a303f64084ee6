//! Document service. Quotes, invoices, contracts and other files tied to projects or clients.

use super::{PageLimits, deleted, found};
use crate::domain::dto::{DocumentPatch, NewDocument};
use crate::domain::{Document, DomainError, EntityId, ListQuery, Page};
use crate::ports::DocumentRepo;
use std::sync::Arc;

pub struct DocumentService {
    repo: Arc<dyn DocumentRepo>,
    limits: PageLimits,
}

impl DocumentService {
    pub fn new(repo: Arc<dyn DocumentRepo>, limits: PageLimits) -> Self {
        Self { repo, limits }
    }

    /// `status` in the query filters by document kind.
    pub async fn get_all_documents(
        &self,
        query: &ListQuery,
    ) -> Result<Page<Document>, DomainError> {
        self.repo
            .list_documents(query, self.limits.request(query))
            .await
    }

    pub async fn get_document(&self, id: EntityId) -> Result<Document, DomainError> {
        found("document", id, self.repo.get_document(id).await?)
    }

    pub async fn create_document(&self, dto: &NewDocument) -> Result<Document, DomainError> {
        dto.validate()?;
        self.repo.create_document(dto).await
    }

    pub async fn update_document(&self, patch: &DocumentPatch) -> Result<Document, DomainError> {
        patch.validate()?;
        found("document", patch.id, self.repo.update_document(patch).await?)
    }

    pub async fn delete_document(&self, id: EntityId) -> Result<bool, DomainError> {
        Ok(deleted("document", id, self.repo.delete_document(id).await))
    }
}
