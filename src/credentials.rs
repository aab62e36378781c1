use crate::error::Error;

/// Caller identity for the JWT grant, loaded once and immutable for the run.
#[derive(Clone)]
pub struct Credentials {
    pub integrator_key: String,
    pub user_id: String,
    pub redirect_uri: String,
    pub private_key_pem: Vec<u8>,
    pub scopes: Vec<String>,
    pub expires_in_secs: u64,
}

impl Credentials {
    /// Creates a credential set, rejecting obviously unusable values up front.
    ///
    /// The private key itself is only parsed when an assertion is built.
    pub fn new(
        integrator_key: impl Into<String>,
        user_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        private_key_pem: impl Into<Vec<u8>>,
        scopes: Vec<String>,
        expires_in_secs: u64,
    ) -> Result<Self, Error> {
        let integrator_key = integrator_key.into();
        if integrator_key.is_empty() {
            return Err(Error::MissingConfig("integrator_key"));
        }
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(Error::MissingConfig("user_id"));
        }
        // Needed to build the consent URL when the server reports
        // consent_required; an empty value would surface much later there.
        let redirect_uri = redirect_uri.into();
        if redirect_uri.is_empty() {
            return Err(Error::MissingConfig("redirect_uri"));
        }
        if scopes.is_empty() {
            return Err(Error::EmptyScopes);
        }
        Ok(Self {
            integrator_key,
            user_id,
            redirect_uri,
            private_key_pem: private_key_pem.into(),
            scopes,
            expires_in_secs,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("integrator_key", &self.integrator_key)
            .field("user_id", &self.user_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("private_key_pem", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("expires_in_secs", &self.expires_in_secs)
            .finish()
    }
}
