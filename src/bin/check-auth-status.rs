use mimalloc::MiMalloc;
use std::process::ExitCode;

use mondrh_ops::probe::{self, auth::AuthState};
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
    report::banner(format!("Authentication status of {}", cfg.probe.base_url));

    let result = match probe::auth::run(&cfg.probe, &cfg.admin).await {
        Ok(r) => r,
        Err(e) => {
            report::error("probe setup", &e);
            return report::finish(false, "", "probe could not start");
        }
    };

    probe::print_steps(&result.steps, result.aborted.as_ref());
    probe::print_cookies(&result.cookies);

    let state = result.state();
    report::section("Result");
    report::info(format!("authentication: {state}"));
    if state != AuthState::Authenticated {
        report::detail("1. check that the admin account exists (check-admin-status)");
        report::detail("2. log in again from a browser and compare");
        report::detail("3. try the test form at /test/jobs/form");
    }
    report::finish(
        state == AuthState::Authenticated,
        "admin authentication works",
        format!("admin authentication: {state}"),
    )
}
