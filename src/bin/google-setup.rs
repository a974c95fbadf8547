use mimalloc::MiMalloc;
use std::process::ExitCode;

use mondrh_ops::google_oauth::{self, endpoints::SCOPES};
use mondrh_ops::report;
use mondrh_ops::runtime;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cfg = match runtime::init_or_exit() {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    report::banner("Google OAuth client setup");

    let setup = match google_oauth::setup(&cfg) {
        Ok(setup) => setup,
        Err(e) => {
            report::error("google setup", &e);
            return report::finish(false, "", "google setup failed");
        }
    };

    report::ok(format!("client configuration written to {}", setup.credentials_path.display()));
    report::section("Scopes");
    for scope in SCOPES {
        report::detail(scope);
    }
    report::section("Consent URL");
    report::detail("open this URL in a browser and approve access:");
    report::detail(&setup.consent_url);

    report::finish(true, "google setup complete", "")
}
