//! Schema migrations. Applied in order inside one transaction; the applied
//! version is mirrored to `PRAGMA user_version`.

use super::rows::repo_err;
use crate::domain::DomainError;
use libsql::{Connection, TransactionBehavior};
use tracing::info;

struct Migration {
    version: u32,
    sql: &'static str,
}

const CORE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    company TEXT,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS addresses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id INTEGER NOT NULL REFERENCES clients (id) ON DELETE CASCADE,
    label TEXT,
    street TEXT NOT NULL,
    city TEXT NOT NULL,
    postal_code TEXT,
    country TEXT,
    is_primary INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_addresses_client ON addresses (client_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_addresses_primary ON addresses (client_id)
    WHERE is_primary = 1;

CREATE TABLE IF NOT EXISTS staff (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    role TEXT,
    email TEXT,
    phone TEXT,
    hourly_rate REAL,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id INTEGER REFERENCES clients (id) ON DELETE SET NULL,
    name TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'planned',
    start_date TEXT,
    end_date TEXT,
    budget REAL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_projects_client ON projects (client_id);

CREATE TABLE IF NOT EXISTS stages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects (id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_stages_project ON stages (project_id, position);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    stage_id INTEGER NOT NULL REFERENCES stages (id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'todo',
    assignee_id INTEGER REFERENCES staff (id) ON DELETE SET NULL,
    due_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_stage ON tasks (stage_id);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    color TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS project_tags (
    project_id INTEGER NOT NULL REFERENCES projects (id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags (id) ON DELETE CASCADE,
    PRIMARY KEY (project_id, tag_id)
);
"#;

const RESOURCE_AND_PLANNING_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS materials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    unit TEXT NOT NULL,
    unit_price REAL,
    stock REAL NOT NULL DEFAULT 0 CHECK (stock >= 0),
    supplier TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS vehicles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    plate_number TEXT NOT NULL UNIQUE,
    model TEXT,
    assigned_staff_id INTEGER REFERENCES staff (id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER REFERENCES projects (id) ON DELETE SET NULL,
    client_id INTEGER REFERENCES clients (id) ON DELETE SET NULL,
    title TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'other',
    file_url TEXT,
    amount REAL,
    issued_on TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_documents_project ON documents (project_id);
CREATE INDEX IF NOT EXISTS idx_documents_client ON documents (client_id);

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    starts_at TEXT NOT NULL,
    ends_at TEXT NOT NULL,
    location TEXT,
    project_id INTEGER REFERENCES projects (id) ON DELETE SET NULL,
    staff_id INTEGER REFERENCES staff (id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK (ends_at >= starts_at)
);
CREATE INDEX IF NOT EXISTS idx_events_window ON events (starts_at, ends_at);

CREATE TABLE IF NOT EXISTS time_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    staff_id INTEGER NOT NULL REFERENCES staff (id) ON DELETE CASCADE,
    project_id INTEGER REFERENCES projects (id) ON DELETE SET NULL,
    task_id INTEGER REFERENCES tasks (id) ON DELETE SET NULL,
    date TEXT NOT NULL,
    hours REAL NOT NULL CHECK (hours > 0 AND hours <= 24),
    note TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_time_logs_project ON time_logs (project_id, staff_id);
"#;

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: CORE_TABLES,
    },
    Migration {
        version: 2,
        sql: RESOURCE_AND_PLANNING_TABLES,
    },
];

/// Latest schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Applies every pending migration. Fails when the database is newer than the binary.
pub(crate) async fn apply_migrations(conn: &Connection) -> Result<(), DomainError> {
    let current = current_version(conn).await?;
    let latest = latest_version();

    if current > latest {
        return Err(DomainError::Repo(format!(
            "unsupported schema version: database is at {current}, binary supports up to {latest}"
        )));
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .await
        .map_err(repo_err)?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tx.execute_batch(migration.sql).await.map_err(repo_err)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            .await
            .map_err(repo_err)?;
    }
    tx.commit().await.map_err(repo_err)?;

    info!(from = current, to = latest, "schema migrated");
    Ok(())
}

pub(crate) async fn current_version(conn: &Connection) -> Result<u32, DomainError> {
    let mut rows = conn
        .query("PRAGMA user_version", ())
        .await
        .map_err(repo_err)?;
    let version = match rows.next().await.map_err(repo_err)? {
        Some(row) => super::rows::int(&row, 0)?,
        None => 0,
    };
    u32::try_from(version).map_err(|_| DomainError::Repo(format!("bad user_version {version}")))
}
