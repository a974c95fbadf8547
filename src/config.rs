//! Tool configuration.
//!
//! Values are layered, lowest priority first:
//!
//! 1. built-in defaults (`Config::default()`)
//! 2. the application's own variables: `DATABASE_URL`, `GOOGLE_CLIENT_ID`,
//!    `GOOGLE_CLIENT_SECRET`
//! 3. `MONDRH_`-prefixed variables, nested with `__`
//! 4. `MONDRH_ADMIN__PASSWORD` again, taken verbatim so values such as
//!    `[abc]` are not parsed as arrays
//!
//! ```bash
//! DATABASE_URL="sqlite:///monderh.db"
//! MONDRH_ADMIN__EMAIL="admin@monderh.fr"
//! MONDRH_ADMIN__PASSWORD="change-me"
//! MONDRH_PROBE__BASE_URL="https://mondrh.onrender.com"
//! MONDRH_ALLOW_DESTRUCTIVE_RECOVERY=true
//! ```
//!
//! The config is built once per process and passed by reference.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::db::location::{self, DatabaseLocation};
use crate::error::OpsError;

/// The web application's fallback when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///monderh.db";

pub const ADMIN_PASSWORD_VAR: &str = "MONDRH_ADMIN__PASSWORD";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// `DATABASE_URL` as set for the web application; `None` when unset.
    #[serde(default, deserialize_with = "string_like_opt")]
    pub database_url: Option<String>,
    pub loglevel: String,
    /// Root of the web application checkout; file checks are relative to it.
    pub project_root: PathBuf,
    /// Permits the drop-and-recreate fallback when schema verification fails.
    /// Off by default: that path deletes every existing row.
    pub allow_destructive_recovery: bool,
    #[serde(default, deserialize_with = "string_like_opt")]
    pub google_client_id: Option<String>,
    #[serde(default, deserialize_with = "string_like_opt")]
    pub google_client_secret: Option<String>,
    pub admin: AdminSeed,
    pub probe: ProbeConfig,
}

/// The privileged account the provisioner guarantees.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminSeed {
    pub email: String,
    #[serde(default, deserialize_with = "string_like_opt", skip_serializing)]
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub base_url: Url,
    pub timeout_secs: u64,
    /// Lets the admin-login probe try `POST /register` when login fails.
    pub allow_register: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            loglevel: "info".to_string(),
            project_root: PathBuf::from("."),
            allow_destructive_recovery: false,
            google_client_id: None,
            google_client_secret: None,
            admin: AdminSeed::default(),
            probe: ProbeConfig::default(),
        }
    }
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self {
            email: "admin@monderh.fr".to_string(),
            password: None,
            first_name: "Admin".to_string(),
            last_name: "MonDRH".to_string(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:5000").expect("static URL is valid"),
            timeout_secs: 30,
            allow_register: false,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(&["DATABASE_URL", "GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"]))
            .merge(Env::prefixed("MONDRH_").split("__"));
        match std::env::var(ADMIN_PASSWORD_VAR) {
            Ok(raw) => figment.merge(Serialized::default("admin.password", raw)),
            Err(_) => figment,
        }
    }

    pub fn load() -> Result<Self, OpsError> {
        let config: Self = Self::figment().extract()?;
        Ok(config)
    }

    /// `DATABASE_URL`, or the application's own default when unset.
    pub fn database_url_or_default(&self) -> &str {
        self.database_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_DATABASE_URL)
    }

    pub fn database(&self) -> Result<DatabaseLocation, OpsError> {
        location::resolve(self.database_url_or_default(), &self.project_root)
    }
}

impl AdminSeed {
    /// The injected admin password; there is no built-in fallback.
    pub fn password(&self) -> Result<&str, OpsError> {
        self.password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(OpsError::MissingConfig(ADMIN_PASSWORD_VAR))
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Environment values such as `123456` reach serde as integers; accept them
/// as strings anyway.
fn string_like_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringLike {
        Str(String),
        Int(i64),
        Uint(u64),
        Float(f64),
        Bool(bool),
    }

    let value = Option::<StringLike>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringLike::Str(s) => s,
        StringLike::Int(i) => i.to_string(),
        StringLike::Uint(u) => u.to_string(),
        StringLike::Float(f) => f.to_string(),
        StringLike::Bool(b) => b.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_environment() {
        Jail::expect_with(|_jail| {
            let config = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(config.database_url, None);
            assert_eq!(config.database_url_or_default(), "sqlite:///monderh.db");
            assert_eq!(
                config.database().map_err(|e| e.to_string())?,
                DatabaseLocation::File(PathBuf::from("./instance/monderh.db"))
            );
            assert_eq!(config.probe.timeout_secs, 30);
            assert!(!config.allow_destructive_recovery);
            assert!(config.admin.password.is_none());
            assert!(config.admin.password().is_err());
            Ok(())
        });
    }

    #[test]
    fn application_and_prefixed_variables_override_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "sqlite:////srv/mondrh/data.db");
            jail.set_env("GOOGLE_CLIENT_ID", "client-id.apps.googleusercontent.com");
            jail.set_env("MONDRH_ADMIN__EMAIL", "ops@example.test");
            jail.set_env("MONDRH_ADMIN__PASSWORD", "123456");
            jail.set_env("MONDRH_PROBE__BASE_URL", "https://mondrh.example.test");
            jail.set_env("MONDRH_PROBE__TIMEOUT_SECS", "10");
            jail.set_env("MONDRH_ALLOW_DESTRUCTIVE_RECOVERY", "true");

            let config = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(config.database_url.as_deref(), Some("sqlite:////srv/mondrh/data.db"));
            assert_eq!(
                config.google_client_id.as_deref(),
                Some("client-id.apps.googleusercontent.com")
            );
            assert_eq!(config.admin.email, "ops@example.test");
            assert_eq!(config.admin.password().map_err(|e| e.to_string())?, "123456");
            assert_eq!(config.admin.first_name, "Admin");
            assert_eq!(config.probe.base_url.as_str(), "https://mondrh.example.test/");
            assert_eq!(config.probe.timeout(), Duration::from_secs(10));
            assert!(config.allow_destructive_recovery);
            Ok(())
        });
    }

    #[test]
    fn admin_password_is_read_verbatim() {
        Jail::expect_with(|jail| {
            for raw in ["[abc]", "{x}", "12345678901234567890123", "true"] {
                jail.set_env(ADMIN_PASSWORD_VAR, raw);
                let config = Config::load().map_err(|e| e.to_string())?;
                assert_eq!(config.admin.password().map_err(|e| e.to_string())?, raw);
            }
            Ok(())
        });
    }

    #[test]
    fn prefixed_database_url_counts_as_set() {
        Jail::expect_with(|jail| {
            jail.set_env("MONDRH_DATABASE_URL", "sqlite:////srv/mondrh/prefixed.db");
            let config = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(config.database_url.as_deref(), Some("sqlite:////srv/mondrh/prefixed.db"));
            assert_eq!(
                config.database().map_err(|e| e.to_string())?,
                DatabaseLocation::File(PathBuf::from("/srv/mondrh/prefixed.db"))
            );
            Ok(())
        });
    }

    #[test]
    fn postgres_url_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgresql://user:pw@db.internal/mondrh");
            let config = Config::load().map_err(|e| e.to_string())?;
            let err = config.database().expect_err("postgres is not handled");
            assert!(matches!(err, OpsError::UnsupportedDatabase(ref scheme) if scheme == "postgresql"));
            Ok(())
        });
    }
}
