//! SQLite persistence. `SqliteRepo` implements every repository port; each
//! `*_repo` module holds one port implementation and its row mappings.

mod clients_repo;
mod documents_repo;
mod filter;
mod planning_repo;
mod projects_repo;
mod resources_repo;
mod rows;
mod schema;
pub mod sqlite_repo;

pub use schema::latest_version;
pub use sqlite_repo::{DB_FILE_NAME, SqliteRepo};
