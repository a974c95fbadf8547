use chrono::Local;
use mimalloc::MiMalloc;
use std::process::ExitCode;

use mondrh_ops::db::{self, OpenMode, status};
use mondrh_ops::deployment::{self, DeploymentChecker};
use mondrh_ops::env_check::{self, APP_VARS};
use mondrh_ops::report;
use mondrh_ops::runtime;
use mondrh_ops::service;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = match runtime::init_or_exit() {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    report::banner("Production configuration diagnostics");
    report::info(format!("time: {}", Local::now()));
    report::info(format!(
        "environment: {}",
        std::env::var("FLASK_ENV").unwrap_or_else(|_| "not set".to_string())
    ));

    let vars = env_check::check_process_env(APP_VARS);
    env_check::print(&vars);

    report::section("Tooling environment");
    report::ok(format!("mondrh-ops {}", env!("CARGO_PKG_VERSION")));
    match std::env::current_dir() {
        Ok(dir) => report::ok(format!("working directory: {}", dir.display())),
        Err(e) => report::warn(format!("working directory unavailable: {e}")),
    }
    let path_dirs = std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).count())
        .unwrap_or(0);
    report::ok(format!("PATH: {path_dirs} directories"));

    deployment::print_permissions(&DeploymentChecker::new(cfg.project_root.clone()).permissions());

    report::section("Database");
    let mut db_ok = false;
    match db::open(&cfg, OpenMode::MustExist).await {
        Ok(pool) => {
            match status::table_counts(&pool, status::COUNTED_TABLES).await {
                Ok(counts) => {
                    db_ok = true;
                    report::ok("database connection succeeded");
                    for count in &counts {
                        match &count.rows {
                            Ok(n) => report::ok(format!("table {}: {n} rows", count.table.label)),
                            Err(e) => report::fail(format!("table {}: {e}", count.table.label)),
                        }
                    }
                }
                Err(e) => report::error("database connection", &e),
            }

            report::section("Admin users");
            match service::diagnose(&pool).await {
                Ok(d) if d.has_admin() => {
                    report::ok(format!("{} admin user(s) found", d.admins.len()));
                    for admin in &d.admins {
                        report::detail(format!(
                            "• {} ({}) - active: {}",
                            admin.email,
                            admin.display_name(),
                            admin.is_active
                        ));
                    }
                }
                Ok(_) => report::fail("no admin user found"),
                Err(e) => report::error("admin lookup", &e),
            }
        }
        Err(e) => report::error("database connection", &e),
    }

    let missing = env_check::missing_critical(&vars);
    println!();
    report::rule();
    println!("🎯 Recommendations:");
    report::detail("1. check that DATABASE_URL is set correctly");
    report::detail("2. make sure SECRET_KEY is set and secure");
    report::detail("3. check that FLASK_ENV=production");
    report::detail("4. make sure at least one admin user exists");
    report::detail("5. check the application logs for details");
    if !missing.is_empty() {
        report::warn(format!("missing critical variables: {missing:?}"));
    }

    report::finish(
        db_ok,
        "diagnostics complete",
        "database unreachable",
    )
}
