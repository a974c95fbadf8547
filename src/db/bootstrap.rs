//! Schema bootstrap: create what is missing, verify, and only recreate from
//! scratch when the operator has opted in.

use sqlx::SqliteConnection;
use tracing::{error, info, warn};

use crate::db::repair::repair_columns;
use crate::db::schema::TABLES;
use crate::db::sqlite::{self, SqlitePool};
use crate::error::OpsError;
use crate::report;

/// What to do when the schema still fails verification after repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryPolicy {
    /// Report the failure and leave the database untouched.
    Refuse,
    /// Drop every managed table and create it again. All rows are lost.
    DropAndRecreate,
}

impl RecoveryPolicy {
    pub fn from_flag(allow_destructive: bool) -> Self {
        if allow_destructive {
            RecoveryPolicy::DropAndRecreate
        } else {
            RecoveryPolicy::Refuse
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// Tables existed or were created, and verified on the first attempt.
    Ready,
    /// Missing late columns were added, then verification passed.
    Repaired { added: Vec<String> },
    /// Verification kept failing; every table was dropped and recreated.
    Recreated { dropped: Vec<&'static str> },
}

/// Make sure every managed table exists with its expected columns.
pub async fn ensure_schema(
    pool: &SqlitePool,
    recovery: RecoveryPolicy,
) -> Result<SchemaOutcome, OpsError> {
    let mut conn = pool.acquire().await?;
    sqlite::ping(&mut conn).await?;
    sqlite::create_tables(&mut conn).await?;
    info!("create-if-missing pass finished");

    let Err(first) = verify(&mut conn).await else {
        info!("schema verified");
        return Ok(SchemaOutcome::Ready);
    };
    warn!(error = %first, "schema verification failed; trying column repair");

    let added = repair_columns(&mut conn).await?;
    let Err(second) = verify(&mut conn).await else {
        info!(?added, "schema verified after column repair");
        return Ok(SchemaOutcome::Repaired { added });
    };

    match recovery {
        RecoveryPolicy::Refuse => {
            error!(
                error = %second,
                "schema still invalid; destructive recovery not enabled, leaving data untouched"
            );
            Err(second)
        }
        RecoveryPolicy::DropAndRecreate => {
            let dropped = recreate(&mut conn).await?;
            verify(&mut conn).await?;
            Ok(SchemaOutcome::Recreated { dropped })
        }
    }
}

/// Probe every table's expected columns; the first failure wins.
pub async fn verify(conn: &mut SqliteConnection) -> Result<(), OpsError> {
    for table in TABLES {
        sqlite::probe_table(conn, table)
            .await
            .map_err(|source| OpsError::SchemaVerificationFailed {
                table: table.name,
                source,
            })?;
    }
    Ok(())
}

async fn recreate(conn: &mut SqliteConnection) -> Result<Vec<&'static str>, OpsError> {
    warn!("DESTRUCTIVE RECOVERY: dropping and recreating every table; all existing rows will be lost");
    let dropped = sqlite::drop_tables(conn).await?;
    for table in &dropped {
        warn!(table, "table dropped");
    }
    sqlite::create_tables(conn).await?;
    warn!(count = dropped.len(), "tables recreated empty");
    Ok(dropped)
}

pub fn print_outcome(outcome: &SchemaOutcome) {
    match outcome {
        SchemaOutcome::Ready => report::ok("all tables present and verified"),
        SchemaOutcome::Repaired { added } => {
            report::ok(format!("tables verified after adding columns: {added:?}"))
        }
        SchemaOutcome::Recreated { dropped } => {
            report::warn(format!("tables DROPPED and recreated, all rows lost: {dropped:?}"))
        }
    }
}
