//! Database module: schema, models and the operations the tools run on it.
//!
//! Layout:
//! - `location.rs`: `DATABASE_URL` to SQLite file resolution
//! - `schema.rs`: SQL DDL and table metadata (SQLite-first)
//! - `models.rs`: Rust structs mirroring DB rows and insert payloads
//! - `sqlite.rs`: connection setup and the individual queries
//! - `bootstrap.rs`: create/verify/recover the schema
//! - `repair.rs`: add columns missing from older databases
//! - `status.rs`: read-only row counts

pub mod bootstrap;
pub mod location;
pub mod models;
pub mod repair;
pub mod schema;
pub mod sqlite;
pub mod status;

pub use bootstrap::{RecoveryPolicy, SchemaOutcome, ensure_schema};
pub use location::{DatabaseLocation, OpenMode};
pub use models::{DbAccount, Role};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, connect};

/// Open the database named by the configuration.
pub async fn open(cfg: &crate::config::Config, mode: OpenMode) -> Result<SqlitePool, crate::error::OpsError> {
    connect(&cfg.database()?, mode).await
}
