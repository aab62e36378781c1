use crate::account::{derive_base_path, select_account};
use crate::context::ClientContext;
use crate::credentials::Credentials;
use crate::error::Error;
use crate::models::TokenResponse;
use crate::oauth::OAuthClient;

/// Result of a completed bootstrap.
#[derive(Debug, Clone)]
pub struct BootstrapOutcome {
    pub account_id: String,
    pub base_path: String,
    pub token: TokenResponse,
}

/// Sequential JWT-grant bootstrap: assertion, token exchange, account
/// resolution, context configuration.
///
/// The context is only written in the final step, so a failure anywhere
/// leaves it exactly as it was. Run once per token lifetime; expiry
/// detection and re-running are the caller's responsibility.
pub struct JwtBootstrap {
    context: ClientContext,
    credentials: Credentials,
    account_id: Option<String>,
}

impl JwtBootstrap {
    pub fn new(context: ClientContext, credentials: Credentials) -> Self {
        Self {
            context,
            credentials,
            account_id: None,
        }
    }

    /// Selects an explicit account instead of the server's first entry.
    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn run(&self, client: &OAuthClient) -> Result<BootstrapOutcome, Error> {
        let token = client.request_user_token(&self.credentials)?;
        let user_info = client.get_user_info(&token.access_token)?;
        let account = select_account(&user_info.accounts, self.account_id.as_deref())?;
        let base_path = derive_base_path(&account.base_uri);
        self.context.configure(&token, &base_path)?;
        Ok(BootstrapOutcome {
            account_id: account.account_id.clone(),
            base_path,
            token,
        })
    }
}
