//! Non-destructive repair: add late columns that older databases lack.

use sqlx::SqliteConnection;
use tracing::info;

use crate::db::schema::LATE_COLUMNS;
use crate::db::sqlite;
use crate::error::OpsError;

/// Add every missing late column; returns `table.column` for each one added.
/// Running it again on a repaired database adds nothing.
pub async fn repair_columns(conn: &mut SqliteConnection) -> Result<Vec<String>, OpsError> {
    let mut added = Vec::new();
    for late in LATE_COLUMNS {
        let existing = sqlite::table_columns(conn, &late.table).await?;
        // PRAGMA table_info returns nothing for a missing table; create-if-missing owns that case.
        if existing.is_empty() || existing.iter().any(|c| c.name == late.column) {
            continue;
        }
        sqlite::add_column(conn, &late.table, late.column, late.definition).await?;
        info!(table = late.table.name, column = late.column, "column added");
        added.push(format!("{}.{}", late.table.name, late.column));
    }
    Ok(added)
}
