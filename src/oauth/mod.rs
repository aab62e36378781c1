mod assertion;
mod client;
mod common;
mod requests;

pub use assertion::{build_assertion, Assertion};
pub use client::{OAuthClient, OAuthClientBuilder};
pub use requests::{AuthorizationUriRequest, TokenRequest, RESPONSE_TYPE_CODE};

#[cfg(feature = "async-client")]
pub(crate) use assertion::RETRY_VALIDITY_MARGIN;
#[cfg(feature = "async-client")]
pub(crate) use common::{build_url, consent_scopes, is_consent_required, parse_oauth_error_body};
