//! Remote health probes against a deployed instance of the web application.
//!
//! Layout:
//! - `session.rs`: cookie-carrying HTTP client with visible redirect hops
//! - `rules.rs`: declarative response classification
//! - `auth.rs`: login / admin area / job form sequence
//! - `admin.rs`: site reachability, admin login, optional register fallback

pub mod admin;
pub mod auth;
pub mod rules;
pub mod session;

use reqwest::{Method, StatusCode};
use tracing::{info, warn};
use url::Url;

use crate::error::OpsError;
use crate::report;
pub use rules::{Step, Verdict};
pub use session::{ProbeRequest, ProbeSession};

#[derive(Debug, Clone)]
pub struct StepResult {
    pub step: Step,
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub location: Option<String>,
    pub final_status: StatusCode,
    pub final_url: Url,
    pub verdict: Verdict,
    pub note: &'static str,
    /// First characters of the final body, kept for failed steps.
    pub excerpt: Option<String>,
}

/// A transport error that ended the run early.
#[derive(Debug, Clone)]
pub struct Aborted {
    pub step: Step,
    pub error: String,
}

/// Steps executed so far in one probe run, sharing one session.
/// After a transport error every further step is skipped.
pub struct ProbeRun {
    session: ProbeSession,
    steps: Vec<StepResult>,
    aborted: Option<Aborted>,
}

impl ProbeRun {
    pub fn new(session: ProbeSession) -> Self {
        Self {
            session,
            steps: Vec::new(),
            aborted: None,
        }
    }

    pub fn session(&self) -> &ProbeSession {
        &self.session
    }

    /// Run `step`; `None` if the run is (or just became) aborted.
    pub async fn step(&mut self, step: Step, request: ProbeRequest<'_>) -> Option<Verdict> {
        if self.aborted.is_some() {
            return None;
        }
        match self.session.send(request).await {
            Ok(exchange) => {
                let (verdict, note) = rules::classify(step, &exchange);
                info!(
                    %step,
                    status = %exchange.status,
                    final_status = %exchange.final_status,
                    final_url = %exchange.final_url,
                    ?verdict,
                    "probe step classified"
                );
                let excerpt =
                    (!verdict.is_success()).then(|| report::truncate(&exchange.body, 200));
                self.steps.push(StepResult {
                    step,
                    method: request.method(),
                    path: request.path().to_string(),
                    status: exchange.status,
                    location: exchange.location,
                    final_status: exchange.final_status,
                    final_url: exchange.final_url,
                    verdict,
                    note,
                    excerpt,
                });
                Some(verdict)
            }
            Err(e) => {
                warn!(%step, error = %e, "probe aborted by transport error");
                self.aborted = Some(Aborted {
                    step,
                    error: e.to_string(),
                });
                None
            }
        }
    }

    pub fn finish(self) -> (Vec<StepResult>, Option<Aborted>, Vec<(String, String)>) {
        let cookies = self.session.cookies();
        (self.steps, self.aborted, cookies)
    }
}

/// Build a run for `base` with the configured timeout.
pub fn start(base: Url, timeout: std::time::Duration) -> Result<ProbeRun, OpsError> {
    Ok(ProbeRun::new(ProbeSession::new(base, timeout)?))
}

pub fn verdict_of(steps: &[StepResult], step: Step) -> Option<Verdict> {
    steps.iter().find(|s| s.step == step).map(|s| s.verdict)
}

pub fn print_steps(steps: &[StepResult], aborted: Option<&Aborted>) {
    for (i, s) in steps.iter().enumerate() {
        report::section(format!("{}. {} ({} {})", i + 1, s.step, s.method, s.path));
        report::info(format!("status: {}", s.status));
        if let Some(loc) = &s.location {
            report::info(format!("location: {loc}"));
        }
        if s.final_url.path() != s.path || s.final_status != s.status {
            report::info(format!("final: {} {}", s.final_status, s.final_url));
        }
        if s.verdict.is_success() {
            report::ok(s.note);
        } else if s.verdict == Verdict::Unexpected {
            report::warn(s.note);
        } else {
            report::fail(format!("{} ({:?})", s.note, s.verdict));
            if let Some(excerpt) = &s.excerpt {
                report::detail(format!("response: {excerpt}"));
            }
        }
    }
    if let Some(a) = aborted {
        report::section(format!("{} aborted", a.step));
        report::fail(format!("transport error: {}", a.error));
        report::detail("remaining steps skipped");
    }
}

pub fn print_cookies(cookies: &[(String, String)]) {
    report::section("Session cookies");
    if cookies.is_empty() {
        report::fail("no session cookie");
        return;
    }
    for (name, value) in cookies {
        report::ok(format!("{name}: {}", report::truncate(value, 20)));
    }
}
