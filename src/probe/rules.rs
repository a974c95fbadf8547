//! Response classification table for the remote probes.
//!
//! The classifier is a heuristic: it looks at the final status, the final
//! URL path and, for a few rules, a marker in the body. Rules are checked in
//! order; the first match wins. Anything unmatched is `Unexpected` (200 or
//! redirect) or `Failed` (any other status).

use reqwest::StatusCode;
use std::fmt;

use super::session::Exchange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    SiteRoot,
    LoginPage,
    SubmitLogin,
    AdminArea,
    JobForm,
    Register,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::SiteRoot => "site root",
            Step::LoginPage => "login page",
            Step::SubmitLogin => "login submission",
            Step::AdminArea => "admin area",
            Step::JobForm => "job creation form",
            Step::Register => "registration",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    Redirect,
    Error,
}

impl From<StatusCode> for StatusClass {
    fn from(status: StatusCode) -> Self {
        if status == StatusCode::OK {
            StatusClass::Ok
        } else if status.is_redirection() {
            StatusClass::Redirect
        } else {
            StatusClass::Error
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Reachable,
    Authenticated,
    LoginFailed,
    Authorized,
    Rejected,
    Registered,
    Unexpected,
    Failed,
}

impl Verdict {
    pub fn is_success(self) -> bool {
        matches!(
            self,
            Verdict::Reachable | Verdict::Authenticated | Verdict::Authorized | Verdict::Registered
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub step: Step,
    pub status: StatusClass,
    /// Whether at least one redirect was followed; `None` matches both.
    pub redirected: Option<bool>,
    pub path_contains: Option<&'static str>,
    pub body_contains: Option<&'static str>,
    pub verdict: Verdict,
    pub note: &'static str,
}

const fn rule(step: Step, status: StatusClass, verdict: Verdict, note: &'static str) -> Rule {
    Rule {
        step,
        status,
        redirected: None,
        path_contains: None,
        body_contains: None,
        verdict,
        note,
    }
}

impl Rule {
    const fn path(mut self, needle: &'static str) -> Self {
        self.path_contains = Some(needle);
        self
    }

    const fn body(mut self, needle: &'static str) -> Self {
        self.body_contains = Some(needle);
        self
    }

    const fn after_redirect(mut self) -> Self {
        self.redirected = Some(true);
        self
    }

    pub fn matches(&self, step: Step, exchange: &Exchange) -> bool {
        let path = exchange.final_url.path();
        self.step == step
            && self.status == StatusClass::from(exchange.final_status)
            && self.redirected.is_none_or(|r| r == exchange.redirected())
            && self.path_contains.is_none_or(|n| path.contains(n))
            && self
                .body_contains
                .is_none_or(|n| exchange.body.to_lowercase().contains(&n.to_lowercase()))
    }
}

use StatusClass::{Ok as Ok200, Redirect};
use Step::*;
use Verdict::*;

pub const RULES: &[Rule] = &[
    rule(SiteRoot, Ok200, Reachable, "site reachable"),
    rule(LoginPage, Ok200, Reachable, "login page reachable"),
    rule(SubmitLogin, Ok200, Authenticated, "landed in the admin area").path("admin"),
    rule(SubmitLogin, Ok200, Authenticated, "landed on the dashboard").path("dashboard"),
    rule(SubmitLogin, Ok200, LoginFailed, "email or password incorrect; the account may not exist")
        .path("login")
        .body("incorrect"),
    rule(SubmitLogin, Ok200, LoginFailed, "stayed on the login page").path("login"),
    rule(AdminArea, Ok200, Rejected, "sent back to the login page").path("login"),
    rule(AdminArea, Ok200, Authorized, "admin access granted").path("admin"),
    rule(JobForm, Ok200, Rejected, "sent back to the login page").path("login"),
    rule(JobForm, Ok200, Authorized, "job form reachable (simplified debug form)")
        .path("admin/jobs/new")
        .body("Debug Info"),
    rule(JobForm, Ok200, Authorized, "job form reachable").path("admin/jobs/new"),
    rule(Register, Ok200, Rejected, "registration form shown again").path("register"),
    rule(Register, Ok200, Registered, "redirected after registration").after_redirect(),
    rule(Register, Redirect, Registered, "redirected after registration"),
];

/// Classify `exchange` for `step` against `RULES`.
pub fn classify(step: Step, exchange: &Exchange) -> (Verdict, &'static str) {
    classify_with(RULES, step, exchange)
}

pub fn classify_with(rules: &[Rule], step: Step, exchange: &Exchange) -> (Verdict, &'static str) {
    if let Some(rule) = rules.iter().find(|r| r.matches(step, exchange)) {
        return (rule.verdict, rule.note);
    }
    match StatusClass::from(exchange.final_status) {
        StatusClass::Error => (Failed, "error status"),
        StatusClass::Ok | StatusClass::Redirect => (Unexpected, "unexpected destination"),
    }
}
