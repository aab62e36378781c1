use reqwest::StatusCode;
use url::Url;

use crate::error::{fallback_message, Error, OAuthErrorResponse};

const CONSENT_REQUIRED: &str = "consent_required";

/// Scopes requested when constructing the one-time JWT consent URL.
pub(crate) fn consent_scopes() -> [&'static str; 2] {
    ["signature", "impersonation"]
}

pub(crate) fn is_consent_required(err: &OAuthErrorResponse) -> bool {
    err.error == CONSENT_REQUIRED
}

/// Parses an authorization server error body, falling back to the raw text
/// when it is not the documented JSON shape. The server-provided diagnostic
/// is carried verbatim.
pub(crate) fn parse_oauth_error_body(status: StatusCode, body: &[u8]) -> OAuthErrorResponse {
    let mut err =
        serde_json::from_slice::<OAuthErrorResponse>(body).unwrap_or_else(|_| OAuthErrorResponse {
            code: status.as_u16(),
            error: "server_error".to_string(),
            error_description: Some(fallback_message(status, body)),
        });
    if err.code == 0 {
        err.code = status.as_u16();
    }
    err
}

pub(crate) fn build_url(base_url: &Url, segments: &[&str]) -> Result<Url, Error> {
    let mut url = base_url.clone();
    {
        let mut path_segments = url
            .path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl(base_url.to_string()))?;
        path_segments.pop_if_empty();
        for segment in segments {
            path_segments.push(segment);
        }
    }
    Ok(url)
}
