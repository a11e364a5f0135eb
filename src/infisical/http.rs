//! HTTP utilities for Infisical REST API calls

use super::decode::ResponseBody;
use crate::error::{ProviderError, Result};
use reqwest::{Client, Response};
use std::io;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Send a GET request and hand back the still-unread body.
///
/// Non-success statuses are turned into [`ProviderError::Status`]; the error
/// body is read only to log a sanitized excerpt of it.
pub async fn get(client: &Client, url: &str) -> Result<HttpBody> {
    tracing::debug!("GET {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ProviderError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        // Only log a sanitized/truncated error body
        tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
        return Err(ProviderError::Status {
            url: url.to_string(),
            status,
        });
    }

    Ok(HttpBody::new(response))
}

/// Response body of a successful request, not yet read
#[derive(Debug)]
pub struct HttpBody {
    response: Option<Response>,
}

impl HttpBody {
    fn new(response: Response) -> Self {
        Self {
            response: Some(response),
        }
    }
}

impl ResponseBody for HttpBody {
    async fn read_all(&mut self) -> io::Result<Vec<u8>> {
        match self.response.take() {
            Some(response) => response
                .bytes()
                .await
                .map(|bytes| bytes.to_vec())
                .map_err(io::Error::other),
            None => Ok(Vec::new()),
        }
    }

    fn close(mut self) -> io::Result<()> {
        // Dropping an unread response returns its connection to the pool
        drop(self.response.take());
        Ok(())
    }
}

/// Format an API error for display
/// Maps common statuses to short, user-facing hints
pub fn format_api_error(error: &ProviderError) -> String {
    let ProviderError::Status { status, .. } = error else {
        return error.to_string();
    };

    match status.as_u16() {
        401 => "Authentication failed. Check the Infisical API token.".to_string(),
        403 => "Permission denied. The API token cannot access this resource.".to_string(),
        404 => "Resource not found. Check the host and organization id.".to_string(),
        429 => "Rate limit exceeded. Please try again later.".to_string(),
        500..=599 => "Infisical service temporarily unavailable. Please try again.".to_string(),
        _ => error.to_string(),
    }
}
