use crate::error::OpsError;

use oauth2::{AuthUrl, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope, TokenUrl, basic::BasicClient};
use serde::{Deserialize, Serialize};
use url::Url;

pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_CERTS_URI: &str = "https://www.googleapis.com/oauth2/v1/certs";

/// Scopes the web application requests.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

pub const CALLBACK_PATH: &str = "/auth/google/callback";

/// `credentials.json` as read by Google's client libraries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSecretsFile {
    pub installed: ClientSecrets,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub auth_provider_x509_cert_url: String,
    pub redirect_uris: Vec<String>,
}

impl ClientSecrets {
    pub fn new(client_id: &str, client_secret: &str, redirect_uris: Vec<String>) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            auth_uri: GOOGLE_AUTH_URI.to_string(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            auth_provider_x509_cert_url: GOOGLE_CERTS_URI.to_string(),
            redirect_uris,
        }
    }
}

/// Callback URLs for local development and for the deployed site.
pub fn redirect_uris(deployed: &Url) -> Result<Vec<String>, OpsError> {
    let local = Url::parse("http://localhost:5000")?.join(CALLBACK_PATH)?;
    let remote = deployed.join(CALLBACK_PATH)?;
    let mut uris = vec![local.to_string()];
    if remote != local {
        uris.push(remote.to_string());
    }
    Ok(uris)
}

/// Consent-screen URL for `SCOPES`, asking for offline access so Google
/// returns a refresh token.
pub fn authorization_url(secrets: &ClientSecrets) -> Result<(Url, CsrfToken), OpsError> {
    let redirect = secrets
        .redirect_uris
        .last()
        .ok_or(OpsError::MissingConfig("redirect URI"))?;
    let client = BasicClient::new(ClientId::new(secrets.client_id.clone()))
        .set_client_secret(ClientSecret::new(secrets.client_secret.clone()))
        .set_auth_uri(AuthUrl::new(secrets.auth_uri.clone())?)
        .set_token_uri(TokenUrl::new(secrets.token_uri.clone())?)
        .set_redirect_uri(RedirectUrl::new(redirect.clone())?);

    let (url, csrf) = client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
        .add_extra_param("access_type", "offline")
        .add_extra_param("prompt", "consent")
        .url();
    Ok((url, csrf))
}
