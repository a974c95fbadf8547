use mimalloc::MiMalloc;
use std::process::ExitCode;

use mondrh_ops::db::{self, OpenMode, RecoveryPolicy, bootstrap};
use mondrh_ops::report;
use mondrh_ops::runtime;
use mondrh_ops::service::{self, seed};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = match runtime::init_or_exit() {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    report::banner("Application startup checks");

    let pool = match db::open(&cfg, OpenMode::CreateIfMissing).await {
        Ok(pool) => pool,
        Err(e) => {
            report::error("database connection", &e);
            return report::finish(false, "", "database initialization failed");
        }
    };

    report::section("Schema");
    let recovery = RecoveryPolicy::from_flag(cfg.allow_destructive_recovery);
    match db::ensure_schema(&pool, recovery).await {
        Ok(outcome) => bootstrap::print_outcome(&outcome),
        Err(e) => {
            report::error("schema check", &e);
            return report::finish(false, "", "database initialization failed");
        }
    }

    report::section("Sample data");
    seed::print_results(&service::seed_all(&pool).await);

    report::finish(true, "application ready to start", "")
}
