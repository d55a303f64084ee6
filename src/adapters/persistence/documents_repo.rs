//! DocumentRepo over SQLite.

use super::filter::SqlFilter;
use super::rows::{self, Record, SqlValue, now};
use super::sqlite_repo::SqliteRepo;
use crate::domain::dto::{DocumentPatch, NewDocument};
use crate::domain::{Document, DomainError, EntityId, ListQuery, Page, PageRequest};
use crate::ports::DocumentRepo;
use libsql::Row;

impl Record for Document {
    const ENTITY: &'static str = "document";
    const TABLE: &'static str = "documents";
    const COLUMNS: &'static str = "id, project_id, client_id, title, kind, file_url, amount, \
        issued_on, created_at, updated_at";

    fn from_row(row: &Row) -> Result<Self, DomainError> {
        Ok(Self {
            id: rows::id(row, 0)?,
            project_id: rows::opt_int(row, 1)?,
            client_id: rows::opt_int(row, 2)?,
            title: rows::text(row, 3)?,
            kind: rows::enumeration(row, 4)?,
            file_url: rows::opt_text(row, 5)?,
            amount: rows::opt_real(row, 6)?,
            issued_on: rows::opt_date(row, 7)?,
            created_at: rows::timestamp(row, 8)?,
            updated_at: rows::timestamp(row, 9)?,
        })
    }
}

#[async_trait::async_trait]
impl DocumentRepo for SqliteRepo {
    async fn list_documents(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Document>, DomainError> {
        let mut filter = SqlFilter::new();
        filter
            .eq("project_id", query.project_id)
            .eq("client_id", query.client_id)
            .eq("kind", query.status.as_deref())
            .search(&["title", "file_url"], query.search_term());
        self.list_page(&filter, "id", page).await
    }

    async fn get_document(&self, id: EntityId) -> Result<Option<Document>, DomainError> {
        self.find(id).await
    }

    async fn create_document(&self, dto: &NewDocument) -> Result<Document, DomainError> {
        self.insert_row(
            r#"
            INSERT INTO documents (project_id, client_id, title, kind, file_url, amount,
                issued_on, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
            vec![
                dto.project_id.sql(),
                dto.client_id.sql(),
                dto.title.sql(),
                dto.kind.sql(),
                dto.file_url.sql(),
                dto.amount.sql(),
                dto.issued_on.sql(),
                now(),
            ],
        )
        .await
    }

    async fn update_document(
        &self,
        patch: &DocumentPatch,
    ) -> Result<Option<Document>, DomainError> {
        self.update_row(
            r#"
            UPDATE documents SET
                project_id = COALESCE(?2, project_id),
                client_id = COALESCE(?3, client_id),
                title = COALESCE(?4, title),
                kind = COALESCE(?5, kind),
                file_url = COALESCE(?6, file_url),
                amount = COALESCE(?7, amount),
                issued_on = COALESCE(?8, issued_on),
                updated_at = ?9
            WHERE id = ?1
            "#,
            vec![
                patch.id.sql(),
                patch.project_id.sql(),
                patch.client_id.sql(),
                patch.title.sql(),
                patch.kind.sql(),
                patch.file_url.sql(),
                patch.amount.sql(),
                patch.issued_on.sql(),
                now(),
            ],
            patch.id,
        )
        .await
    }

    async fn delete_document(&self, id: EntityId) -> Result<bool, DomainError> {
        self.delete_row::<Document>(id).await
    }
}
