//! Infisical Client
//!
//! HTTP client bound to one Infisical host. The API key and the JSON accept
//! header are installed as default headers, so every request carries them.
//! The client holds no per-request state; clones share one connection pool.

use super::http::{self, HttpBody};
use crate::config::Credential;
use crate::error::{ProviderError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use url::Url;

/// Header carrying the API token (`X-API-Key`)
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

static USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Authenticated Infisical client
#[derive(Clone, Debug)]
pub struct InfisicalClient {
    http: Client,
    base_url: Url,
}

impl InfisicalClient {
    /// Create a client for the resolved credential.
    ///
    /// Fails with [`ProviderError::ClientConstruction`] when the host is not an
    /// absolute http(s) URL or the token cannot be sent as a header value.
    pub fn new(credential: &Credential) -> Result<Self> {
        let base_url = parse_host(&credential.host)?;

        let mut api_key = HeaderValue::from_str(credential.expose_token()).map_err(|_| {
            ProviderError::ClientConstruction(
                "API token contains characters that are not valid in an HTTP header".to_string(),
            )
        })?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::ClientConstruction(e.to_string()))?;

        tracing::debug!(host = %base_url, "Created Infisical client");

        Ok(Self { http, base_url })
    }

    /// Host this client is bound to
    pub fn host(&self) -> &Url {
        &self.base_url
    }

    /// Build an API URL from a path starting with `/`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// GET an API path, returning the unread body
    pub async fn get(&self, path: &str) -> Result<HttpBody> {
        http::get(&self.http, &self.api_url(path)).await
    }
}

fn parse_host(host: &str) -> Result<Url> {
    let url = Url::parse(host)
        .map_err(|e| ProviderError::ClientConstruction(format!("invalid host {host:?}: {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ProviderError::ClientConstruction(format!(
                "unsupported scheme {scheme} in host {host:?}"
            )))
        }
    }

    if url.cannot_be_a_base() || url.host().is_none() {
        return Err(ProviderError::ClientConstruction(format!(
            "host {host:?} has no network location"
        )));
    }

    Ok(url)
}
