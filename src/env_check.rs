//! Presence checks for the web application's environment variables.

use crate::report;

/// Characters of a database URL shown before it is cut off.
pub const DATABASE_URL_PREFIX_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Critical,
    Optional,
}

/// How a present value may be shown on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Plain,
    Truncate(usize),
    Hidden,
}

#[derive(Debug, Clone, Copy)]
pub struct EnvVarSpec {
    pub name: &'static str,
    pub tier: Tier,
    pub visibility: Visibility,
}

pub const DATABASE_URL_VAR: EnvVarSpec = EnvVarSpec {
    name: "DATABASE_URL",
    tier: Tier::Critical,
    visibility: Visibility::Truncate(DATABASE_URL_PREFIX_LEN),
};

pub const APP_VARS: &[EnvVarSpec] = &[
    DATABASE_URL_VAR,
    EnvVarSpec { name: "SECRET_KEY", tier: Tier::Critical, visibility: Visibility::Hidden },
    EnvVarSpec { name: "FLASK_ENV", tier: Tier::Critical, visibility: Visibility::Plain },
    EnvVarSpec { name: "FLASK_DEBUG", tier: Tier::Critical, visibility: Visibility::Plain },
    EnvVarSpec { name: "MAIL_USERNAME", tier: Tier::Optional, visibility: Visibility::Plain },
    EnvVarSpec { name: "MAIL_PASSWORD", tier: Tier::Optional, visibility: Visibility::Hidden },
    EnvVarSpec { name: "GOOGLE_CLIENT_ID", tier: Tier::Optional, visibility: Visibility::Plain },
    EnvVarSpec { name: "GOOGLE_CLIENT_SECRET", tier: Tier::Optional, visibility: Visibility::Hidden },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarStatus {
    Present { display: String },
    Missing,
}

#[derive(Debug, Clone)]
pub struct VarReport {
    pub spec: EnvVarSpec,
    pub status: VarStatus,
}

impl VarReport {
    pub fn is_present(&self) -> bool {
        matches!(self.status, VarStatus::Present { .. })
    }
}

/// Look up every variable in `vars` through `lookup`. Empty values count as missing.
pub fn check_required<F>(vars: &[EnvVarSpec], lookup: F) -> Vec<VarReport>
where
    F: Fn(&str) -> Option<String>,
{
    vars.iter()
        .map(|spec| {
            let status = match lookup(spec.name).filter(|v| !v.is_empty()) {
                Some(value) => VarStatus::Present {
                    display: render(&value, spec.visibility),
                },
                None => VarStatus::Missing,
            };
            VarReport { spec: *spec, status }
        })
        .collect()
}

/// `check_required` against the real process environment.
pub fn check_process_env(vars: &[EnvVarSpec]) -> Vec<VarReport> {
    check_required(vars, |name| std::env::var(name).ok())
}

/// Names of critical variables that are missing.
pub fn missing_critical(reports: &[VarReport]) -> Vec<&'static str> {
    reports
        .iter()
        .filter(|r| r.spec.tier == Tier::Critical && !r.is_present())
        .map(|r| r.spec.name)
        .collect()
}

fn render(value: &str, display: Visibility) -> String {
    match display {
        Visibility::Plain => value.to_string(),
        Visibility::Truncate(n) => report::truncate(value, n),
        Visibility::Hidden => "<set>".to_string(),
    }
}

pub fn print(reports: &[VarReport]) {
    for (tier, title) in [
        (Tier::Critical, "Critical environment variables"),
        (Tier::Optional, "Optional environment variables"),
    ] {
        report::section(title);
        for r in reports.iter().filter(|r| r.spec.tier == tier) {
            match (&r.status, tier) {
                (VarStatus::Present { display }, _) => {
                    report::ok(format!("{}: {display}", r.spec.name))
                }
                (VarStatus::Missing, Tier::Critical) => {
                    report::fail(format!("{}: NOT SET", r.spec.name))
                }
                (VarStatus::Missing, Tier::Optional) => {
                    report::warn(format!("{}: NOT SET (optional)", r.spec.name))
                }
            }
        }
    }
}
