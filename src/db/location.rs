//! Resolve the web application's `DATABASE_URL` to a SQLite file.
//!
//! The application writes SQLAlchemy URLs: `sqlite:///rel.db` is relative to
//! its `instance/` folder, `sqlite:////abs.db` is absolute. Bare
//! `sqlite:path` URLs are accepted with the same rules.

use std::path::{Path, PathBuf};

use crate::error::OpsError;

/// Flask's instance folder, where relative SQLite paths live.
pub const INSTANCE_DIR: &str = "instance";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    pub fn describe(&self) -> String {
        match self {
            DatabaseLocation::Memory => "in-memory database".to_string(),
            DatabaseLocation::File(path) => path.display().to_string(),
        }
    }
}

/// Whether opening a database may create it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    CreateIfMissing,
    MustExist,
}

pub fn resolve(database_url: &str, project_root: &Path) -> Result<DatabaseLocation, OpsError> {
    let (scheme, rest) = database_url
        .split_once(':')
        .ok_or_else(|| OpsError::UnsupportedDatabase(database_url.to_string()))?;
    // `sqlite+pysqlite` and friends name a driver, not another engine.
    let engine = scheme.split('+').next().unwrap_or(scheme);
    if !engine.eq_ignore_ascii_case("sqlite") {
        return Err(OpsError::UnsupportedDatabase(scheme.to_string()));
    }

    let rest = rest.split('?').next().unwrap_or(rest);
    let path = rest
        .strip_prefix("///")
        .or_else(|| rest.strip_prefix("//"))
        .unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        return Ok(DatabaseLocation::Memory);
    }

    let path = Path::new(path);
    if path.is_absolute() {
        Ok(DatabaseLocation::File(path.to_path_buf()))
    } else {
        Ok(DatabaseLocation::File(project_root.join(INSTANCE_DIR).join(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(url: &str) -> PathBuf {
        match resolve(url, Path::new("/srv/app")).unwrap() {
            DatabaseLocation::File(path) => path,
            DatabaseLocation::Memory => panic!("{url} resolved to memory"),
        }
    }

    #[test]
    fn sqlalchemy_relative_path_lands_in_instance_folder() {
        assert_eq!(file("sqlite:///monderh.db"), PathBuf::from("/srv/app/instance/monderh.db"));
        assert_eq!(
            file("sqlite:///data/monderh.db"),
            PathBuf::from("/srv/app/instance/data/monderh.db")
        );
    }

    #[test]
    fn four_slashes_mean_absolute() {
        assert_eq!(file("sqlite:////var/lib/monderh.db"), PathBuf::from("/var/lib/monderh.db"));
        assert_eq!(file("sqlite+pysqlite:////tmp/x.db?timeout=5"), PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn bare_sqlite_urls() {
        assert_eq!(file("sqlite:/tmp/test.db"), PathBuf::from("/tmp/test.db"));
        assert_eq!(file("sqlite:monderh.db"), PathBuf::from("/srv/app/instance/monderh.db"));
        assert_eq!(resolve("sqlite://", Path::new(".")).unwrap(), DatabaseLocation::Memory);
        assert_eq!(resolve("sqlite::memory:", Path::new(".")).unwrap(), DatabaseLocation::Memory);
    }

    #[test]
    fn other_engines_are_rejected() {
        for url in ["postgres://u:p@h/db", "postgresql+psycopg2://h/db", "mysql://h/db", "monderh.db"] {
            assert!(
                matches!(resolve(url, Path::new(".")), Err(OpsError::UnsupportedDatabase(_))),
                "{url}"
            );
        }
    }
}
