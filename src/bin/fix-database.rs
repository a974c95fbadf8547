use mimalloc::MiMalloc;
use std::process::ExitCode;

use mondrh_ops::db::{self, OpenMode, SqlitePool, repair, schema::APPLICATION, sqlite};
use mondrh_ops::report;
use mondrh_ops::runtime;
use mondrh_ops::OpsError;
use tracing::warn;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = match runtime::init_or_exit() {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    report::banner("Database column repair");

    let pool = match db::open(&cfg, OpenMode::MustExist).await {
        Ok(pool) => pool,
        Err(e) => {
            report::error("database connection", &e);
            return report::finish(false, "", "database update failed");
        }
    };

    match fix(&pool).await {
        Ok(true) => report::finish(true, "database updated", ""),
        Ok(false) => report::finish(
            false,
            "",
            "application table not found; run setup-production-db first",
        ),
        Err(e) => {
            report::error("column repair", &e);
            report::finish(false, "", "database update failed")
        }
    }
}

/// Returns `false` when there is no application table to repair.
async fn fix(pool: &SqlitePool) -> Result<bool, OpsError> {
    let mut tx = pool.begin().await?;

    let before = sqlite::table_columns(&mut tx, &APPLICATION).await?;
    if before.is_empty() {
        return Ok(false);
    }
    report::section("Current application columns");
    for col in &before {
        report::detail(format!("- {}", col.name));
    }

    let added = match repair::repair_columns(&mut tx).await {
        Ok(added) => added,
        Err(e) => {
            if let Err(rb) = tx.rollback().await {
                warn!(error = %rb, "rollback failed");
            }
            return Err(e);
        }
    };
    report::section("Repair");
    if added.is_empty() {
        report::ok("all columns already present");
    }
    for column in &added {
        report::ok(format!("{column} added"));
    }

    let after = sqlite::table_columns(&mut tx, &APPLICATION).await?;
    tx.commit().await?;

    report::section("Final application columns");
    for col in &after {
        report::detail(format!("- {}", col.name));
    }
    Ok(true)
}
