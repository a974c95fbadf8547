use std::fmt;
use url::Url;

use super::rules::{Step, Verdict};
use super::{Aborted, ProbeRequest, StepResult, verdict_of};
use crate::config::{AdminSeed, ProbeConfig};
use crate::error::OpsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    LoginFailed,
    Unexpected,
    Unreachable,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthState::Authenticated => "authenticated",
            AuthState::LoginFailed => "login failed",
            AuthState::Unexpected => "unexpected response",
            AuthState::Unreachable => "unreachable",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub struct AuthProbeReport {
    pub base: Url,
    pub steps: Vec<StepResult>,
    pub aborted: Option<Aborted>,
    pub cookies: Vec<(String, String)>,
}

impl AuthProbeReport {
    pub fn state(&self) -> AuthState {
        match verdict_of(&self.steps, Step::SubmitLogin) {
            Some(Verdict::Authenticated) => AuthState::Authenticated,
            Some(Verdict::LoginFailed) => AuthState::LoginFailed,
            Some(_) => AuthState::Unexpected,
            None => AuthState::Unreachable,
        }
    }
}

/// Login page, login submission, admin area, job form; one cookie jar.
pub async fn run(probe: &ProbeConfig, admin: &AdminSeed) -> Result<AuthProbeReport, OpsError> {
    let password = admin.password()?;
    let mut run = super::start(probe.base_url.clone(), probe.timeout())?;

    run.step(Step::LoginPage, ProbeRequest::Get("/login")).await;
    let form = [("email", admin.email.as_str()), ("password", password)];
    run.step(Step::SubmitLogin, ProbeRequest::PostForm("/login", &form))
        .await;
    run.step(Step::AdminArea, ProbeRequest::Get("/admin")).await;
    run.step(Step::JobForm, ProbeRequest::Get("/admin/jobs/new"))
        .await;

    let base = run.session().base().clone();
    let (steps, aborted, cookies) = run.finish();
    Ok(AuthProbeReport {
        base,
        steps,
        aborted,
        cookies,
    })
}
