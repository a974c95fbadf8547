use mimalloc::MiMalloc;
use std::process::ExitCode;

use mondrh_ops::deployment::{self, DeploymentChecker};
use mondrh_ops::env_check::{self, APP_VARS, EnvVarSpec};
use mondrh_ops::report;
use mondrh_ops::runtime;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Settings the application reads at startup; missing ones only warn since
/// the hosting platform injects them.
const STARTUP_SETTINGS: &[&str] = &["SECRET_KEY", "DATABASE_URL", "MAIL_USERNAME"];

fn main() -> ExitCode {
    let cfg = match runtime::init_or_exit() {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    report::banner("Deployment readiness check");
    report::info(format!("project root: {}", cfg.project_root.display()));

    let checker = DeploymentChecker::new(cfg.project_root.clone());
    let mut passed = Vec::new();

    let files = checker.required_files();
    deployment::print_presence("Required files", &files);
    passed.push(files.passed());

    for manifest in checker.manifests() {
        deployment::print_manifest(&manifest);
        passed.push(manifest.passed());
    }

    let dirs = checker.required_dirs();
    deployment::print_presence("Required directories", &dirs);
    passed.push(dirs.passed());

    report::section("Application settings");
    let settings: Vec<EnvVarSpec> = APP_VARS
        .iter()
        .filter(|v| STARTUP_SETTINGS.contains(&v.name))
        .copied()
        .collect();
    let reports = env_check::check_process_env(&settings);
    let mut unset = Vec::new();
    for r in &reports {
        if r.is_present() {
            report::ok(format!("{} configured", r.spec.name));
        } else {
            unset.push(r.spec.name);
        }
    }
    if !unset.is_empty() {
        report::warn(format!("not set here (expected from the deployment environment): {unset:?}"));
    }

    let total = passed.len();
    let ok = passed.iter().filter(|p| **p).count();
    report::section("Summary");
    report::info(format!("{ok}/{total} checks passed"));

    let ready = ok == total;
    if ready {
        report::detail("next steps:");
        report::detail("1. commit and push the code");
        report::detail("2. create the database and web service on the host");
        report::detail("3. set the environment variables");
        report::detail("4. deploy");
    }
    report::finish(
        ready,
        "project ready for deployment",
        "fix the problems above before deploying",
    )
}
