use url::Url;

pub(crate) const DEMO_REST_BASE_PATH: &str = "https://demo.esign.net/restapi";
pub(crate) const STAGE_REST_BASE_PATH: &str = "https://stage.esign.net/restapi";
pub(crate) const PRODUCTION_REST_BASE_PATH: &str = "https://www.esign.net/restapi";

pub(crate) const DEMO_OAUTH_BASE_PATH: &str = "account-d.esign.com";
pub(crate) const STAGE_OAUTH_BASE_PATH: &str = "account-s.esign.com";
pub(crate) const PRODUCTION_OAUTH_BASE_PATH: &str = "account.esign.com";

/// Platform environment selector.
///
/// The REST base path and the OAuth host are both derived from this one
/// value, so the pair can never drift apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Demo,
    Stage,
    Production,
}

impl Environment {
    /// Returns the REST API base path for this environment.
    pub fn rest_base_path(self) -> &'static str {
        match self {
            Environment::Demo => DEMO_REST_BASE_PATH,
            Environment::Stage => STAGE_REST_BASE_PATH,
            Environment::Production => PRODUCTION_REST_BASE_PATH,
        }
    }

    /// Returns the OAuth host (no scheme) for this environment.
    pub fn oauth_base_path(self) -> &'static str {
        match self {
            Environment::Demo => DEMO_OAUTH_BASE_PATH,
            Environment::Stage => STAGE_OAUTH_BASE_PATH,
            Environment::Production => PRODUCTION_OAUTH_BASE_PATH,
        }
    }

    /// Recognizes the environment behind a REST base path.
    ///
    /// Returns `None` for custom hosts; callers keep their previous OAuth
    /// host in that case instead of guessing.
    pub fn from_rest_base_path(base_path: &str) -> Option<Self> {
        let url = Url::parse(base_path).ok()?;
        match url.host_str()? {
            "demo.esign.net" => Some(Environment::Demo),
            "stage.esign.net" => Some(Environment::Stage),
            "www.esign.net" => Some(Environment::Production),
            _ => None,
        }
    }
}
