#![forbid(unsafe_code)]

mod account;
mod bootstrap;
mod client_defaults;
mod context;
mod credentials;
mod environment;
mod error;
mod models;
mod oauth;
#[cfg(feature = "async-client")]
mod oauth_async;

pub use account::{derive_base_path, select_account};

pub use bootstrap::{BootstrapOutcome, JwtBootstrap};

pub use context::ClientContext;

pub use credentials::Credentials;

pub use environment::Environment;

pub use error::{Error, OAuthErrorResponse};

pub use models::{AccountInfo, TokenResponse, UserInfo};

pub use oauth::{
    build_assertion, Assertion, AuthorizationUriRequest, OAuthClient, OAuthClientBuilder,
    TokenRequest, RESPONSE_TYPE_CODE,
};

#[cfg(feature = "async-client")]
pub use oauth_async::{OAuthAsyncClient, OAuthAsyncClientBuilder};
