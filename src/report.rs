//! Console output shared by the operational binaries.
//!
//! Reports are human-readable text on stdout; each line carries a glyph for
//! its severity. Structured logs go through `tracing` separately.

use std::fmt::Display;
use std::process::ExitCode;

use crate::error::OpsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Severity {
    pub fn glyph(self) -> &'static str {
        match self {
            Severity::Ok => "✅",
            Severity::Warn => "⚠️ ",
            Severity::Fail => "❌",
            Severity::Info => "📋",
        }
    }
}

pub fn banner(title: impl Display) {
    println!("🚀 {title}");
    rule();
}

pub fn rule() {
    println!("{}", "=".repeat(60));
}

pub fn section(title: impl Display) {
    println!();
    println!("🔍 {title}");
}

pub fn line(severity: Severity, msg: impl Display) {
    println!("   {} {msg}", severity.glyph());
}

pub fn ok(msg: impl Display) {
    line(Severity::Ok, msg);
}

pub fn warn(msg: impl Display) {
    line(Severity::Warn, msg);
}

pub fn fail(msg: impl Display) {
    line(Severity::Fail, msg);
}

pub fn info(msg: impl Display) {
    line(Severity::Info, msg);
}

/// Detail line nested under the previous one.
pub fn detail(msg: impl Display) {
    println!("      {msg}");
}

/// Final verdict line and the matching process exit code.
pub fn finish(success: bool, ok_msg: impl Display, fail_msg: impl Display) -> ExitCode {
    println!();
    rule();
    if success {
        println!("🎉 {ok_msg}");
        ExitCode::SUCCESS
    } else {
        println!("❌ {fail_msg}");
        ExitCode::FAILURE
    }
}

/// Print an error and a short hint about which class of problem it is.
pub fn error(context: impl Display, err: &OpsError) {
    fail(format!("{context}: {err}"));
    let hint = match err {
        OpsError::MissingConfig(_) | OpsError::Config(_) | OpsError::UnsupportedDatabase(_) => {
            Some("check the environment variables and .env file")
        }
        OpsError::DatabaseNotFound(_) => {
            Some("check DATABASE_URL, or run setup-production-db to create the database")
        }
        e if e.is_connectivity() => Some("the target is unreachable; is it running?"),
        OpsError::SchemaVerificationFailed { .. } => {
            Some("run fix-database, or set MONDRH_ALLOW_DESTRUCTIVE_RECOVERY=true to recreate")
        }
        _ => None,
    };
    if let Some(hint) = hint {
        detail(format!("💡 {hint}"));
    }
}

/// Shorten a value for display, appending `...` when it was cut.
pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        let head: String = value.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_values() {
        assert_eq!(truncate("sqlite://a.db", 20), "sqlite://a.db");
    }

    #[test]
    fn truncate_cuts_on_char_boundaries() {
        assert_eq!(truncate("postgres://user:pw@host/db", 20), "postgres://user:pw@h...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn finish_maps_to_exit_codes() {
        assert_eq!(finish(true, "done", "failed"), ExitCode::SUCCESS);
        assert_eq!(finish(false, "done", "failed"), ExitCode::FAILURE);
    }
}
