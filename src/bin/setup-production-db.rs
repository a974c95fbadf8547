use mimalloc::MiMalloc;
use std::process::ExitCode;

use mondrh_ops::db::{self, OpenMode, RecoveryPolicy, bootstrap};
use mondrh_ops::env_check::DATABASE_URL_PREFIX_LEN;
use mondrh_ops::report;
use mondrh_ops::runtime;
use mondrh_ops::service::{self, PasswordHasher, ProvisionOutcome, seed};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = match runtime::init_or_exit() {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    report::banner("Production database setup");

    let Some(database_url) = cfg.database_url.as_deref().filter(|u| !u.is_empty()) else {
        report::fail("DATABASE_URL is not set");
        return report::finish(false, "", "database setup failed");
    };
    report::ok(format!(
        "database URL detected: {}",
        report::truncate(database_url, DATABASE_URL_PREFIX_LEN)
    ));
    match cfg.database() {
        Ok(location) => report::info(format!("database: {}", location.describe())),
        Err(e) => {
            report::error("DATABASE_URL", &e);
            return report::finish(false, "", "database setup failed");
        }
    }

    let pool = match db::open(&cfg, OpenMode::CreateIfMissing).await {
        Ok(pool) => pool,
        Err(e) => {
            report::error("database connection", &e);
            return report::finish(false, "", "database setup failed");
        }
    };

    report::section("Schema");
    let recovery = RecoveryPolicy::from_flag(cfg.allow_destructive_recovery);
    match db::ensure_schema(&pool, recovery).await {
        Ok(outcome) => bootstrap::print_outcome(&outcome),
        Err(e) => {
            report::error("schema setup", &e);
            return report::finish(false, "", "database setup failed");
        }
    }

    report::section("Admin account");
    let hasher = PasswordHasher::default();
    match service::ensure_admin(&pool, &cfg.admin, &hasher).await {
        Ok(ProvisionOutcome::Created { .. }) => {
            report::ok(format!("admin account created: {}", cfg.admin.email))
        }
        Ok(ProvisionOutcome::Promoted { previous, .. }) => report::ok(format!(
            "{} promoted to admin (was {previous})",
            cfg.admin.email
        )),
        Ok(ProvisionOutcome::AlreadyAdmin { .. }) => {
            report::ok(format!("admin account already present: {}", cfg.admin.email))
        }
        Err(e) => {
            report::error("admin provisioning", &e);
            return report::finish(false, "", "admin account creation failed");
        }
    }

    report::section("Sample data");
    seed::print_results(&service::seed_all(&pool).await);

    report::section("Summary");
    report::info(format!("admin email: {}", cfg.admin.email));
    report::info(format!("site: {}", cfg.probe.base_url));
    report::finish(true, "production setup complete", "")
}
