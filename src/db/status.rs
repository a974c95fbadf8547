//! Read-only database status: connectivity and per-table row counts.

use tracing::warn;

use crate::db::schema::{APPLICATION, APPOINTMENT, JOB_OFFER, TableSpec, USER};
use crate::db::sqlite::{self, SqlitePool};
use crate::error::OpsError;

/// Tables counted by the production status report.
pub const COUNTED_TABLES: &[TableSpec] = &[USER, APPLICATION, APPOINTMENT, JOB_OFFER];

#[derive(Debug)]
pub struct TableCount {
    pub table: TableSpec,
    pub rows: Result<i64, OpsError>,
}

/// Count rows in each table independently; one broken table does not hide
/// the others.
pub async fn table_counts(
    pool: &SqlitePool,
    tables: &[TableSpec],
) -> Result<Vec<TableCount>, OpsError> {
    let mut conn = pool.acquire().await?;
    sqlite::ping(&mut conn).await?;

    let mut counts = Vec::with_capacity(tables.len());
    for table in tables {
        let rows = sqlite::count(&mut conn, table).await;
        if let Err(e) = &rows {
            warn!(table = table.name, error = %e, "count failed");
        }
        counts.push(TableCount { table: *table, rows });
    }
    Ok(counts)
}
