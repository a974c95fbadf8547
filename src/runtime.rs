//! Process setup shared by every binary: `.env`, configuration, tracing.

use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::OpsError;
use crate::report;

/// Load `.env`, extract the configuration and install the tracing subscriber.
/// Tracing is installed even when configuration fails, at `info`.
pub fn init() -> Result<Config, OpsError> {
    dotenvy::dotenv().ok();

    let cfg = Config::load();
    let loglevel = cfg
        .as_ref()
        .map(|c| c.loglevel.clone())
        .unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    if let Ok(cfg) = &cfg {
        info!(
            database_url = %report::truncate(cfg.database_url_or_default(), crate::env_check::DATABASE_URL_PREFIX_LEN),
            probe_base = %cfg.probe.base_url,
            project_root = %cfg.project_root.display(),
            destructive_recovery = cfg.allow_destructive_recovery,
            loglevel = %cfg.loglevel
        );
    }
    cfg
}

/// `init`, printing the failure and returning the exit code if it fails.
pub fn init_or_exit() -> Result<Config, ExitCode> {
    init().map_err(|e| {
        report::error("configuration", &e);
        ExitCode::FAILURE
    })
}
