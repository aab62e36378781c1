use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

pub(crate) const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Error body returned by the authorization server on a failed request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OAuthErrorResponse {
    /// HTTP status code; filled in from the response when the body omits it.
    pub code: u16,
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code={}, error={}", self.code, self.error)?;
        if let Some(ref description) = self.error_description {
            write!(f, ", description={}", description)?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("requested scope set is empty")]
    EmptyScopes,
    #[error("invalid assertion expiry: {0} seconds")]
    InvalidExpiry(u64),
    #[error("missing configuration value: {0}")]
    MissingConfig(&'static str),
    #[error("consent required; grant access once at {consent_uri}")]
    ConsentRequired { consent_uri: String },
    #[error("authorization server error: {0}")]
    AuthServer(OAuthErrorResponse),
    #[error("no accounts returned for the authenticated user")]
    NoAccounts,
    #[error("account not found: {0}")]
    AccountNotFound(String),
}

pub(crate) fn fallback_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    if body.is_empty() {
        format!("http status {}", status.as_u16())
    } else {
        format!(
            "http status {}: {}",
            status.as_u16(),
            String::from_utf8_lossy(body)
        )
    }
}

pub(crate) fn read_body_with_limit(
    resp: &mut reqwest::blocking::Response,
    limit: usize,
) -> Result<Vec<u8>, Error> {
    let mut body = Vec::new();
    resp.by_ref().take(limit as u64).read_to_end(&mut body)?;
    Ok(body)
}

#[cfg(feature = "async-client")]
pub(crate) async fn read_body_with_limit_async(
    resp: &mut reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, Error> {
    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        let remaining = limit.saturating_sub(body.len());
        if remaining == 0 {
            break;
        }
        let take = chunk.len().min(remaining);
        body.extend_from_slice(&chunk[..take]);
    }
    Ok(body)
}
