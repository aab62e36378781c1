use reqwest::{Client as HttpClient, Response, StatusCode};
use std::time::Duration;
use url::Url;

use crate::client_defaults::DEFAULT_TIMEOUT;
use crate::credentials::Credentials;
use crate::error::{read_body_with_limit_async, Error, OAuthErrorResponse, MAX_ERROR_BODY_BYTES};
use crate::environment::Environment;
use crate::models::{TokenResponse, UserInfo};
use crate::oauth::{
    build_assertion, build_url, consent_scopes, is_consent_required, parse_oauth_error_body,
    Assertion, AuthorizationUriRequest, TokenRequest, RETRY_VALIDITY_MARGIN,
};

pub struct OAuthAsyncClientBuilder {
    base_url: Url,
    timeout: Option<Duration>,
}

impl OAuthAsyncClientBuilder {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, Error> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            timeout: Some(DEFAULT_TIMEOUT),
        })
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<OAuthAsyncClient, Error> {
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
        Ok(OAuthAsyncClient {
            base_url: self.base_url,
            audience,
            http,
        })
    }
}

/// Async twin of [`crate::OAuthClient`], method for method.
pub struct OAuthAsyncClient {
    base_url: Url,
    audience: String,
    http: HttpClient,
}

impl OAuthAsyncClient {
    pub fn builder(base_url: impl AsRef<str>) -> Result<OAuthAsyncClientBuilder, Error> {
        OAuthAsyncClientBuilder::new(base_url)
    }

    pub fn for_environment(environment: Environment) -> Result<Self, Error> {
        Self::builder(format!("https://{}", environment.oauth_base_path()))?.build()
    }

    pub async fn request_user_token(
        &self,
        credentials: &Credentials,
    ) -> Result<TokenResponse, Error> {
        self.request_token(credentials, Some(credentials.user_id.as_str()))
            .await
    }

    pub async fn request_application_token(
        &self,
        credentials: &Credentials,
    ) -> Result<TokenResponse, Error> {
        self.request_token(credentials, None).await
    }

    async fn request_token(
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
        let resp = self.post_assertion(&assertion).await?;
        self.expect_token(resp, credentials).await
    }

    /// Same bounded retry rule as the sync client: one retry on a transport
    /// failure while the assertion is still within its validity window.
    async fn post_assertion(&self, assertion: &Assertion) -> Result<Response, Error> {
        let url = build_url(&self.base_url, &["oauth", "token"])?;
        let form = TokenRequest::new(assertion.as_str()).to_form();
        let mut retried = false;
        loop {
            let result = self
                .http
                .post(url.clone())
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(form.clone())
                .send()
                .await;
            match result {
                Ok(resp) => return Ok(resp),
                Err(e)
                    if !retried
                        && (e.is_timeout() || e.is_connect())
                        && assertion.valid_for(RETRY_VALIDITY_MARGIN) =>
                {
                    log::warn!("transport failure during token exchange, retrying once: {e}");
                    retried = true;
                }
                Err(e) => return Err(Error::Transport(e)),
            }
        }
    }

    async fn expect_token(
        &self,
        resp: Response,
        credentials: &Credentials,
    ) -> Result<TokenResponse, Error> {
        let status = resp.status();
        if status != StatusCode::OK {
            return self.parse_error(resp, Some(credentials)).await;
        }
        let token = resp.json::<TokenResponse>().await?;
        if token.access_token.is_empty() {
            return Err(Error::AuthServer(OAuthErrorResponse {
                code: status.as_u16(),
                error: "invalid_response".to_string(),
                error_description: Some("empty access_token in token response".to_string()),
            }));
        }
        Ok(token)
    }

    pub async fn get_user_info(&self, access_token: &str) -> Result<UserInfo, Error> {
        let url = build_url(&self.base_url, &["oauth", "userinfo"])?;
        let resp = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await?;
        if resp.status() == StatusCode::OK {
            resp.json::<UserInfo>().await.map_err(Error::from)
        } else {
            self.parse_error(resp, None).await
        }
    }

    pub fn authorization_uri(&self, request: &AuthorizationUriRequest) -> Result<String, Error> {
        let mut url = build_url(&self.base_url, &["oauth", "auth"])?;
        url.set_query(Some(&request.to_query()));
        Ok(url.to_string())
    }

    pub fn jwt_consent_uri(&self, client_id: &str, redirect_uri: &str) -> Result<String, Error> {
        let request =
            AuthorizationUriRequest::new(client_id, redirect_uri).scopes(consent_scopes());
        self.authorization_uri(&request)
    }

    async fn parse_error<T>(
        &self,
        mut resp: Response,
        credentials: Option<&Credentials>,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = read_body_with_limit_async(&mut resp, MAX_ERROR_BODY_BYTES).await?;
        let err = parse_oauth_error_body(status, &body);
        if is_consent_required(&err) {
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
