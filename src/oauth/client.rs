use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

use crate::client_defaults::DEFAULT_TIMEOUT;
use crate::credentials::Credentials;
use crate::error::{read_body_with_limit, Error, OAuthErrorResponse, MAX_ERROR_BODY_BYTES};
use crate::environment::Environment;
use crate::models::{TokenResponse, UserInfo};
use crate::oauth::assertion::{build_assertion, Assertion, RETRY_VALIDITY_MARGIN};
use crate::oauth::common;
use crate::oauth::requests::{AuthorizationUriRequest, TokenRequest};

pub struct OAuthClientBuilder {
    base_url: Url,
    timeout: Option<Duration>,
}

impl OAuthClientBuilder {
    /// Creates a builder for the given OAuth base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, Error> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            timeout: Some(DEFAULT_TIMEOUT),
        })
    }

    /// Sets the request timeout for the underlying HTTP client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<OAuthClient, Error> {
        let audience = self
            .base_url
            .host_str()
            .ok_or_else(|| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .to_string();
        let mut builder = HttpClient::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(OAuthClient {
            base_url: self.base_url,
            audience,
            http,
        })
    }
}

/// Blocking client for the authorization server: token exchange, identity
/// lookup, and consent URL construction.
pub struct OAuthClient {
    base_url: Url,
    audience: String,
    http: HttpClient,
}

impl OAuthClient {
    pub fn builder(base_url: impl AsRef<str>) -> Result<OAuthClientBuilder, Error> {
        OAuthClientBuilder::new(base_url)
    }

    /// Creates a client pointed at the given environment's OAuth host.
    pub fn for_environment(environment: Environment) -> Result<Self, Error> {
        Self::builder(format!("https://{}", environment.oauth_base_path()))?.build()
    }

    /// Exchanges a user-impersonation JWT grant for a bearer token.
    pub fn request_user_token(&self, credentials: &Credentials) -> Result<TokenResponse, Error> {
        self.request_token(credentials, Some(credentials.user_id.as_str()))
    }

    /// Exchanges an application-level JWT grant (no subject user).
    pub fn request_application_token(
        &self,
        credentials: &Credentials,
    ) -> Result<TokenResponse, Error> {
        self.request_token(credentials, None)
    }

    fn request_token(
        &self,
        credentials: &Credentials,
        subject_user_id: Option<&str>,
    ) -> Result<TokenResponse, Error> {
        let assertion = build_assertion(
            &credentials.integrator_key,
            subject_user_id,
            &credentials.scopes,
            &credentials.private_key_pem,
            credentials.expires_in_secs,
            &self.audience,
        )?;
        let resp = self.post_assertion(&assertion)?;
        self.expect_token(resp, credentials)
    }

    /// Posts the assertion to the token endpoint, retrying at most once on a
    /// transport failure while the assertion is still within its validity
    /// window. Server-side failures are never retried here.
    fn post_assertion(&self, assertion: &Assertion) -> Result<Response, Error> {
        let url = common::build_url(&self.base_url, &["oauth", "token"])?;
        let form = TokenRequest::new(assertion.as_str()).to_form();
        let mut retried = false;
        loop {
            let result = self
                .http
                .post(url.clone())
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(form.clone())
                .send();
            match result {
                Ok(resp) => return Ok(resp),
                Err(e)
                    if !retried
                        && is_transport_failure(&e)
                        && assertion.valid_for(RETRY_VALIDITY_MARGIN) =>
                {
                    log::warn!("transport failure during token exchange, retrying once: {e}");
                    retried = true;
                }
                Err(e) => return Err(Error::Transport(e)),
            }
        }
    }

    fn expect_token(
        &self,
        resp: Response,
        credentials: &Credentials,
    ) -> Result<TokenResponse, Error> {
        let status = resp.status();
        if status != StatusCode::OK {
            return self.parse_error(resp, Some(credentials));
        }
        let token = resp.json::<TokenResponse>()?;
        if token.access_token.is_empty() {
            return Err(Error::AuthServer(OAuthErrorResponse {
                code: status.as_u16(),
                error: "invalid_response".to_string(),
                error_description: Some("empty access_token in token response".to_string()),
            }));
        }
        Ok(token)
    }

    /// Queries the identity endpoint with the bearer token.
    pub fn get_user_info(&self, access_token: &str) -> Result<UserInfo, Error> {
        let url = common::build_url(&self.base_url, &["oauth", "userinfo"])?;
        let resp = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {access_token}"))
            .send()?;
        if resp.status() == StatusCode::OK {
            resp.json::<UserInfo>().map_err(Error::from)
        } else {
            self.parse_error(resp, None)
        }
    }

    /// Constructs the authorization URL for the consent flow. Never invoked
    /// by this client.
    pub fn authorization_uri(&self, request: &AuthorizationUriRequest) -> Result<String, Error> {
        let mut url = common::build_url(&self.base_url, &["oauth", "auth"])?;
        url.set_query(Some(&request.to_query()));
        Ok(url.to_string())
    }

    /// The one-time consent URL an operator must visit before the first JWT
    /// exchange for this integration can succeed.
    pub fn jwt_consent_uri(&self, client_id: &str, redirect_uri: &str) -> Result<String, Error> {
        let request = AuthorizationUriRequest::new(client_id, redirect_uri)
            .scopes(common::consent_scopes());
        self.authorization_uri(&request)
    }

    fn parse_error<T>(
        &self,
        mut resp: Response,
        credentials: Option<&Credentials>,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = read_body_with_limit(&mut resp, MAX_ERROR_BODY_BYTES)?;
        let err = common::parse_oauth_error_body(status, &body);
        if common::is_consent_required(&err) {
            if let Some(credentials) = credentials {
                let consent_uri =
                    self.jwt_consent_uri(&credentials.integrator_key, &credentials.redirect_uri)?;
                log::warn!("user consent not yet granted; grant access once at {consent_uri}");
                return Err(Error::ConsentRequired { consent_uri });
            }
        }
        Err(Error::AuthServer(err))
    }
}

fn is_transport_failure(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect()
}
