use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::LOCATION;
use reqwest::{Method, StatusCode, redirect};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::OpsError;

/// Redirect hops followed per request before giving up and classifying the
/// redirect itself.
pub const MAX_REDIRECTS: usize = 5;

/// One request as sent by a probe step.
#[derive(Debug, Clone, Copy)]
pub enum ProbeRequest<'a> {
    Get(&'a str),
    PostForm(&'a str, &'a [(&'a str, &'a str)]),
}

impl ProbeRequest<'_> {
    pub fn path(&self) -> &str {
        match self {
            ProbeRequest::Get(p) | ProbeRequest::PostForm(p, _) => p,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            ProbeRequest::Get(_) => Method::GET,
            ProbeRequest::PostForm(..) => Method::POST,
        }
    }
}

/// A request together with every redirect hop followed for it.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Status of the first response.
    pub status: StatusCode,
    /// `Location` of the first response, if it was a redirect.
    pub location: Option<String>,
    pub hops: Vec<Url>,
    pub final_status: StatusCode,
    pub final_url: Url,
    pub body: String,
}

impl Exchange {
    pub fn redirected(&self) -> bool {
        !self.hops.is_empty()
    }
}

/// HTTP client with a cookie jar shared by every step of one probe run.
/// Redirects are followed by hand so each hop stays visible.
pub struct ProbeSession {
    client: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
}

impl ProbeSession {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, OpsError> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .user_agent("mondrh-ops/0.3")
            .cookie_provider(jar.clone())
            .redirect(redirect::Policy::none())
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, jar, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub async fn send(&self, request: ProbeRequest<'_>) -> Result<Exchange, OpsError> {
        let url = self.base.join(request.path())?;
        let builder = match request {
            ProbeRequest::Get(_) => self.client.get(url),
            ProbeRequest::PostForm(_, form) => self.client.post(url).form(form),
        };
        let mut resp = builder.send().await?;

        let status = resp.status();
        let location = location_of(&resp);
        let mut hops = Vec::new();
        while resp.status().is_redirection() && hops.len() < MAX_REDIRECTS {
            let Some(loc) = location_of(&resp) else {
                break;
            };
            let next = resp.url().join(&loc)?;
            debug!(from = %resp.url(), to = %next, status = %resp.status(), "following redirect");
            hops.push(next.clone());
            resp = self.client.get(next).send().await?;
        }

        let final_status = resp.status();
        let final_url = resp.url().clone();
        let body = resp.text().await?;
        Ok(Exchange {
            status,
            location,
            hops,
            final_status,
            final_url,
            body,
        })
    }

    /// Cookies currently held for the base URL as `(name, value)` pairs.
    pub fn cookies(&self) -> Vec<(String, String)> {
        let Some(header) = self.jar.cookies(&self.base) else {
            return Vec::new();
        };
        header
            .to_str()
            .unwrap_or_default()
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                Some((name.to_string(), value.to_string()))
            })
            .collect()
    }
}

fn location_of(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
