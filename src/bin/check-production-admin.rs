use chrono::Local;
use mimalloc::MiMalloc;
use std::process::ExitCode;

use mondrh_ops::probe;
use mondrh_ops::report;
use mondrh_ops::runtime;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = match runtime::init_or_exit() {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    report::banner("Production admin account check");
    report::info(format!("site: {}", cfg.probe.base_url));
    report::info(format!("time: {}", Local::now()));
    report::info(format!("admin email: {}", cfg.admin.email));

    let result = match probe::admin::run(&cfg.probe, &cfg.admin).await {
        Ok(r) => r,
        Err(e) => {
            report::error("probe setup", &e);
            return report::finish(false, "", "probe could not start");
        }
    };
    probe::print_steps(&result.steps, result.aborted.as_ref());

    if !result.admin_works {
        report::section("Next steps");
        match result.registered {
            Some(true) => report::ok("admin account registered through /register"),
            Some(false) => report::fail("registration through /register failed"),
            None if !cfg.probe.allow_register => {
                report::info("set MONDRH_PROBE__ALLOW_REGISTER=true to try /register")
            }
            None => {}
        }
        report::detail("1. check the deployment logs for setup-production-db output");
        report::detail("2. check that the database service is running");
        report::detail("3. check DATABASE_URL and SECRET_KEY on the deployment");
        report::detail("4. redeploy if the setup step did not run");
    }

    report::finish(
        result.admin_works,
        format!("admin account works; log in with {}", cfg.admin.email),
        "admin account missing or not working",
    )
}
