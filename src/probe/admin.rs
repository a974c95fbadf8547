use tracing::info;
use url::Url;

use super::rules::{Step, Verdict};
use super::{Aborted, ProbeRequest, StepResult};
use crate::config::{AdminSeed, ProbeConfig};
use crate::error::OpsError;

#[derive(Debug)]
pub struct AdminProbeReport {
    pub base: Url,
    pub steps: Vec<StepResult>,
    pub aborted: Option<Aborted>,
    /// Login reached the admin dashboard.
    pub admin_works: bool,
    /// `None` when the fallback did not run.
    pub registered: Option<bool>,
}

/// Check that the configured admin can log in on the deployed site.
///
/// If login fails and `probe.allow_register` is set, try to create the
/// account through the public registration form. That call writes to the
/// remote database, so it never runs by default.
pub async fn run(probe: &ProbeConfig, admin: &AdminSeed) -> Result<AdminProbeReport, OpsError> {
    let password = admin.password()?;
    let mut run = super::start(probe.base_url.clone(), probe.timeout())?;

    let mut admin_works = false;
    let mut registered = None;

    let site = run.step(Step::SiteRoot, ProbeRequest::Get("/")).await;
    if site == Some(Verdict::Reachable) {
        let form = [
            ("email", admin.email.as_str()),
            ("password", password),
            ("remember_me", "false"),
        ];
        let login = run
            .step(Step::SubmitLogin, ProbeRequest::PostForm("/login", &form))
            .await;
        admin_works = login == Some(Verdict::Authenticated);

        if login.is_some() && !admin_works {
            if probe.allow_register {
                let form = [
                    ("email", admin.email.as_str()),
                    ("password", password),
                    ("first_name", admin.first_name.as_str()),
                    ("last_name", admin.last_name.as_str()),
                    ("account_type", "admin"),
                    ("company", "MonDRH"),
                ];
                let reg = run
                    .step(Step::Register, ProbeRequest::PostForm("/register", &form))
                    .await;
                registered = reg.map(|v| v == Verdict::Registered);
            } else {
                info!("login failed; remote registration fallback disabled");
            }
        }
    }

    let base = run.session().base().clone();
    let (steps, aborted, _cookies) = run.finish();
    Ok(AdminProbeReport {
        base,
        steps,
        aborted,
        admin_works,
        registered,
    })
}
