use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use url::Url;

use super::endpoints::{ClientSecrets, ClientSecretsFile, authorization_url, redirect_uris};
use crate::config::Config;
use crate::error::OpsError;

pub const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug)]
pub struct GoogleSetup {
    pub credentials_path: PathBuf,
    pub consent_url: Url,
}

/// Write `credentials.json` into the project root and build the consent URL.
pub fn setup(cfg: &Config) -> Result<GoogleSetup, OpsError> {
    let client_id = cfg
        .google_client_id
        .as_deref()
        .ok_or(OpsError::MissingConfig("GOOGLE_CLIENT_ID"))?;
    let client_secret = cfg
        .google_client_secret
        .as_deref()
        .ok_or(OpsError::MissingConfig("GOOGLE_CLIENT_SECRET"))?;

    let secrets = ClientSecrets::new(client_id, client_secret, redirect_uris(&cfg.probe.base_url)?);
    let credentials_path = write_credentials(&cfg.project_root, &secrets)?;
    let (consent_url, _csrf) = authorization_url(&secrets)?;

    Ok(GoogleSetup {
        credentials_path,
        consent_url,
    })
}

pub fn write_credentials(root: &Path, secrets: &ClientSecrets) -> Result<PathBuf, OpsError> {
    let path = root.join(CREDENTIALS_FILE);
    let doc = ClientSecretsFile {
        installed: secrets.clone(),
    };
    fs::write(&path, serde_json::to_string_pretty(&doc)?)?;
    info!(path = %path.display(), "client secrets written");
    Ok(path)
}
