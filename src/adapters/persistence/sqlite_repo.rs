//! SQLite-backed repository via libsql. Implements every repository port.
//!
//! One database file (`bizdesk.db`) in the configured data directory holds the
//! schema shared by all microservices. Each call opens its own connection with
//! foreign keys enabled; multi-step writes run inside a libsql transaction.

use super::filter::SqlFilter;
use super::rows::{Record, repo_err};
use super::schema::apply_migrations;
use crate::domain::{DomainError, EntityId, Page, PageRequest};
use libsql::{Connection, Database, Transaction, TransactionBehavior, Value, params_from_iter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DB_FILE_NAME: &str = "bizdesk.db";

/// How long a connection waits for another writer to release the lock.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite repository. Safe to share via `Arc` between services.
pub struct SqliteRepo {
    db: Database,
    db_path: PathBuf,
}

impl SqliteRepo {
    /// Connect to (or create) the database and apply pending migrations.
    ///
    /// Sets WAL mode and synchronous=NORMAL for concurrent readers with one writer.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Repo(e.to_string()))?;
        let db_path = base.join(DB_FILE_NAME);
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(repo_err)?;

        let repo = Self { db, db_path };
        let conn = repo.conn().await?;

        // PRAGMA returns a row (the new value), so it is run as a query and drained;
        // execute fails when rows come back.
        drain_pragma(&conn, "PRAGMA journal_mode=WAL").await?;
        drain_pragma(&conn, "PRAGMA synchronous=NORMAL").await?;
        apply_migrations(&conn).await?;

        info!(path = %repo.db_path.display(), "SQLite connected with WAL mode");
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// New connection with foreign key enforcement on and a busy timeout.
    pub(crate) async fn conn(&self) -> Result<Connection, DomainError> {
        let conn = self.db.connect().map_err(repo_err)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(repo_err)?;
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(repo_err)?;
        Ok(conn)
    }

    pub(crate) async fn find<T: Record>(&self, id: EntityId) -> Result<Option<T>, DomainError> {
        let conn = self.conn().await?;
        find_in(&conn, id).await
    }

    /// Deletes one row by id. Returns whether a row was removed.
    pub(crate) async fn delete_row<T: Record>(&self, id: EntityId) -> Result<bool, DomainError> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1", T::TABLE),
                params_from_iter([Value::Integer(id)]),
            )
            .await
            .map_err(repo_err)?;
        debug!(entity = T::ENTITY, id, affected, "delete");
        Ok(affected > 0)
    }

    /// Runs a filtered, paginated select plus the matching `COUNT(*)`.
    pub(crate) async fn list_page<T: Record>(
        &self,
        filter: &SqlFilter,
        order_by: &str,
        page: PageRequest,
    ) -> Result<Page<T>, DomainError> {
        let conn = self.conn().await?;
        let where_sql = filter.where_sql();

        let count_sql = format!("SELECT COUNT(*) FROM {}{where_sql}", T::TABLE);
        let total = query_scalar_i64(&conn, &count_sql, filter.params()).await?;

        let (limit_sql, params) = filter.paged(page);
        let select_sql = format!(
            "SELECT {} FROM {}{where_sql} ORDER BY {order_by}{limit_sql}",
            T::COLUMNS,
            T::TABLE
        );
        let items = query_all::<T>(&conn, &select_sql, params).await?;

        Ok(Page::new(items, u64::try_from(total).unwrap_or(0), page))
    }

    /// Runs an `UPDATE ... WHERE id = ?1` and re-reads the row when it matched.
    pub(crate) async fn update_row<T: Record>(
        &self,
        sql: &str,
        params: Vec<Value>,
        id: EntityId,
    ) -> Result<Option<T>, DomainError> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(sql, params_from_iter(params))
            .await
            .map_err(repo_err)?;
        if affected == 0 {
            return Ok(None);
        }
        find_in(&conn, id).await
    }

    /// Runs an `INSERT` and reads the new row back.
    pub(crate) async fn insert_row<T: Record>(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<T, DomainError> {
        let conn = self.conn().await?;
        insert_in(&conn, sql, params).await
    }
}

/// Starts a write transaction that takes the write lock up front.
pub(crate) async fn begin_write(conn: &Connection) -> Result<Transaction, DomainError> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .await
        .map_err(repo_err)
}

async fn drain_pragma(conn: &Connection, sql: &str) -> Result<(), DomainError> {
    let mut rows = conn
        .query(sql, ())
        .await
        .map_err(|e| DomainError::Repo(format!("{sql} failed: {e}")))?;
    while rows.next().await.map_err(repo_err)?.is_some() {}
    Ok(())
}

/// Fetches one row by id on an existing connection (or transaction).
pub(crate) async fn find_in<T: Record>(
    conn: &Connection,
    id: EntityId,
) -> Result<Option<T>, DomainError> {
    let sql = format!("SELECT {} FROM {} WHERE id = ?1", T::COLUMNS, T::TABLE);
    let mut items = query_all::<T>(conn, &sql, vec![Value::Integer(id)]).await?;
    Ok(items.pop())
}

/// Inserts on an existing connection and returns the stored row.
pub(crate) async fn insert_in<T: Record>(
    conn: &Connection,
    sql: &str,
    params: Vec<Value>,
) -> Result<T, DomainError> {
    conn.execute(sql, params_from_iter(params))
        .await
        .map_err(repo_err)?;
    let id = conn.last_insert_rowid();
    find_in(conn, id)
        .await?
        .ok_or_else(|| DomainError::Repo(format!("{} {id} vanished after insert", T::ENTITY)))
}

pub(crate) async fn query_all<T: Record>(
    conn: &Connection,
    sql: &str,
    params: Vec<Value>,
) -> Result<Vec<T>, DomainError> {
    let mut rows = conn
        .query(sql, params_from_iter(params))
        .await
        .map_err(repo_err)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next().await.map_err(repo_err)? {
        items.push(T::from_row(&row)?);
    }
    Ok(items)
}

/// First column of the first row as an integer; 0 when the query yields nothing.
pub(crate) async fn query_scalar_i64(
    conn: &Connection,
    sql: &str,
    params: Vec<Value>,
) -> Result<i64, DomainError> {
    let mut rows = conn
        .query(sql, params_from_iter(params))
        .await
        .map_err(repo_err)?;
    match rows.next().await.map_err(repo_err)? {
        Some(row) => Ok(super::rows::opt_int(&row, 0)?.unwrap_or(0)),
        None => Ok(0),
    }
}

/// Runs a statement and returns the number of affected rows.
pub(crate) async fn execute(
    conn: &Connection,
    sql: &str,
    params: Vec<Value>,
) -> Result<u64, DomainError> {
    conn.execute(sql, params_from_iter(params))
        .await
        .map_err(repo_err)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::SqliteRepo;
    use tempfile::TempDir;

    /// Fresh migrated database in a temp directory. Keep the `TempDir` alive.
    pub(crate) async fn repo() -> (SqliteRepo, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = SqliteRepo::connect(dir.path()).await.expect("connect");
        (repo, dir)
    }
}
