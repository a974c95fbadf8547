//! Deployment readiness: required files, directories and manifest contents
//! of the web application checkout.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::report;

pub const REQUIRED_FILES: &[&str] = &[
    "app.py",
    "requirements.txt",
    "Procfile",
    "runtime.txt",
    "render.yaml",
    "setup_production_db.py",
    "build.sh",
    "config.py",
    ".gitignore",
];

pub const REQUIRED_DIRS: &[&str] = &["static", "static/uploads", "templates", "templates/admin"];

pub const PERMISSION_TARGETS: &[&str] = &["app.py", "config.py", "requirements.txt", "static/uploads"];

/// Whether a failed check blocks deployment or is only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Required,
    Advisory,
}

/// Substrings that must appear somewhere in a manifest file.
#[derive(Debug, Clone, Copy)]
pub struct ManifestCheck {
    pub file: &'static str,
    pub keywords: &'static [&'static str],
    pub strictness: Strictness,
}

pub const MANIFEST_CHECKS: &[ManifestCheck] = &[
    ManifestCheck {
        file: "requirements.txt",
        keywords: &["Flask", "gunicorn", "psycopg2-binary", "Flask-SQLAlchemy"],
        strictness: Strictness::Required,
    },
    ManifestCheck {
        file: ".gitignore",
        keywords: &["*.db", "instance/", "venv/", ".env", "__pycache__/", "*.pyc"],
        strictness: Strictness::Advisory,
    },
    ManifestCheck {
        file: "render.yaml",
        keywords: &[
            "type: web",
            "env: python",
            "buildCommand:",
            "startCommand:",
            "gunicorn",
            "setup_production_db.py",
        ],
        strictness: Strictness::Required,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceReport {
    pub present: Vec<&'static str>,
    pub missing: Vec<&'static str>,
}

impl PresenceReport {
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestStatus {
    Checked {
        found: Vec<&'static str>,
        missing: Vec<&'static str>,
    },
    Unreadable(String),
}

#[derive(Debug, Clone)]
pub struct ManifestReport {
    pub check: ManifestCheck,
    pub status: ManifestStatus,
}

impl ManifestReport {
    /// Advisory manifests only fail when they cannot be read at all.
    pub fn passed(&self) -> bool {
        match (&self.status, self.check.strictness) {
            (ManifestStatus::Unreadable(_), _) => false,
            (ManifestStatus::Checked { .. }, Strictness::Advisory) => true,
            (ManifestStatus::Checked { missing, .. }, Strictness::Required) => missing.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionReport {
    pub path: &'static str,
    pub exists: bool,
    pub readable: bool,
    /// `None` for directories.
    pub writable: Option<bool>,
}

pub struct DeploymentChecker {
    root: PathBuf,
}

impl DeploymentChecker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn required_files(&self) -> PresenceReport {
        self.presence(REQUIRED_FILES, |p| p.is_file())
    }

    pub fn required_dirs(&self) -> PresenceReport {
        self.presence(REQUIRED_DIRS, |p| p.is_dir())
    }

    fn presence(&self, names: &[&'static str], exists: impl Fn(&Path) -> bool) -> PresenceReport {
        let (present, missing) = names
            .iter()
            .copied()
            .partition(|name| exists(&self.root.join(name)));
        PresenceReport { present, missing }
    }

    pub fn manifest(&self, check: ManifestCheck) -> ManifestReport {
        let path = self.root.join(check.file);
        let status = match fs::read_to_string(&path) {
            Ok(contents) => {
                let (found, missing) = check
                    .keywords
                    .iter()
                    .copied()
                    .partition(|kw| contents.contains(kw));
                ManifestStatus::Checked { found, missing }
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "manifest unreadable");
                ManifestStatus::Unreadable(e.to_string())
            }
        };
        ManifestReport { check, status }
    }

    pub fn manifests(&self) -> Vec<ManifestReport> {
        MANIFEST_CHECKS.iter().map(|c| self.manifest(*c)).collect()
    }

    pub fn permissions(&self) -> Vec<PermissionReport> {
        PERMISSION_TARGETS
            .iter()
            .map(|name| {
                let path = self.root.join(name);
                match fs::metadata(&path) {
                    Ok(meta) => PermissionReport {
                        path: name,
                        exists: true,
                        readable: is_readable(&path, meta.is_dir()),
                        writable: meta.is_file().then(|| !meta.permissions().readonly()),
                    },
                    Err(_) => PermissionReport {
                        path: name,
                        exists: false,
                        readable: false,
                        writable: None,
                    },
                }
            })
            .collect()
    }
}

fn is_readable(path: &Path, is_dir: bool) -> bool {
    if is_dir {
        fs::read_dir(path).is_ok()
    } else {
        fs::File::open(path).is_ok()
    }
}

pub fn print_presence(title: &str, report: &PresenceReport) {
    report::section(title);
    for name in &report.present {
        report::ok(name);
    }
    if report.passed() {
        report::ok("all present");
    } else {
        report::fail(format!("missing: {:?}", report.missing));
    }
}

pub fn print_manifest(manifest: &ManifestReport) {
    report::section(format!("Checking {}", manifest.check.file));
    match &manifest.status {
        ManifestStatus::Unreadable(e) => report::fail(format!("cannot read: {e}")),
        ManifestStatus::Checked { found, missing } => {
            for kw in found {
                report::ok(kw);
            }
            if !missing.is_empty() {
                let msg = format!("missing entries: {missing:?}");
                match manifest.check.strictness {
                    Strictness::Required => report::fail(msg),
                    Strictness::Advisory => report::warn(msg),
                }
            }
        }
    }
}

pub fn print_permissions(reports: &[PermissionReport]) {
    report::section("File permissions");
    for p in reports {
        if !p.exists {
            report::fail(format!("{}: does not exist", p.path));
            continue;
        }
        if p.readable {
            report::ok(format!("{}: readable", p.path));
        } else {
            report::fail(format!("{}: not readable", p.path));
        }
        match p.writable {
            Some(true) => report::ok(format!("{}: writable", p.path)),
            Some(false) => report::warn(format!("{}: not writable", p.path)),
            None => {}
        }
    }
}
