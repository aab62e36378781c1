const GRANT_TYPE_JWT_BEARER: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// OAuth response type for the authorization-code consent flow.
pub const RESPONSE_TYPE_CODE: &str = "code";

/// Token endpoint request carrying a signed grant assertion.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub assertion: String,
}

impl TokenRequest {
    pub fn new(assertion: impl Into<String>) -> Self {
        Self {
            assertion: assertion.into(),
        }
    }

    /// Serializes the request into an application/x-www-form-urlencoded body.
    pub fn to_form(&self) -> String {
        let mut params = url::form_urlencoded::Serializer::new(String::new());
        params.append_pair("grant_type", GRANT_TYPE_JWT_BEARER);
        params.append_pair("assertion", &self.assertion);
        params.finish()
    }
}

/// Parameters for the one-time consent URL.
///
/// The URL is constructed, never invoked: the operator visits it manually
/// before the first JWT exchange can succeed.
#[derive(Debug, Clone)]
pub struct AuthorizationUriRequest {
    pub client_id: String,
    pub scopes: Vec<String>,
    pub redirect_uri: String,
    pub response_type: String,
    pub state: Option<String>,
}

impl AuthorizationUriRequest {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            scopes: Vec::new(),
            redirect_uri: redirect_uri.into(),
            response_type: RESPONSE_TYPE_CODE.to_string(),
            state: None,
        }
    }

    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn response_type(mut self, response_type: impl Into<String>) -> Self {
        self.response_type = response_type.into();
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Renders the query string in the documented literal format: scopes are
    /// space-joined and percent-encoded, the redirect URI fully encoded, and
    /// `state` appended only when non-empty.
    pub fn to_query(&self) -> String {
        let mut query = format!(
            "response_type={}&scope={}&client_id={}&redirect_uri={}",
            self.response_type,
            self.scopes.join("%20"),
            percent_encode(&self.client_id),
            percent_encode(&self.redirect_uri),
        );
        if let Some(ref state) = self.state {
            if !state.is_empty() {
                query.push_str("&state=");
                query.push_str(&percent_encode(state));
            }
        }
        query
    }
}

fn percent_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::form_urlencoded;

    fn form_value(form: &str, name: &str) -> Option<String> {
        form_urlencoded::parse(form.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.to_string())
    }

    #[test]
    fn token_request_uses_jwt_bearer_grant() {
        let form = TokenRequest::new("a.b.c").to_form();
        assert_eq!(
            form_value(&form, "grant_type").as_deref(),
            Some("urn:ietf:params:oauth:grant-type:jwt-bearer")
        );
        assert_eq!(form_value(&form, "assertion").as_deref(), Some("a.b.c"));
    }

    #[test]
    fn authorization_query_matches_documented_format() {
        let query = AuthorizationUriRequest::new("IK1", "https://callback.example/run")
            .scopes(["signature", "impersonation"])
            .state("xyz")
            .to_query();
        assert_eq!(
            query,
            "response_type=code&scope=signature%20impersonation&client_id=IK1\
             &redirect_uri=https%3A%2F%2Fcallback.example%2Frun&state=xyz"
        );
    }

    #[test]
    fn state_with_reserved_characters_is_encoded() {
        let query = AuthorizationUriRequest::new("IK1", "https://cb")
            .scopes(["signature"])
            .state("a b&c=d")
            .to_query();
        assert!(query.ends_with("&state=a%20b%26c%3Dd"), "query: {query}");
    }

    #[test]
    fn empty_state_is_omitted() {
        let query = AuthorizationUriRequest::new("IK1", "https://cb")
            .scopes(["signature"])
            .state("")
            .to_query();
        assert!(!query.contains("state="));
    }
}
