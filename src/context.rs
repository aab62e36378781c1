use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::environment::Environment;
use crate::error::Error;
use crate::models::TokenResponse;

pub(crate) const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Debug)]
struct ContextInner {
    base_path: String,
    oauth_base_path: String,
    default_headers: HashMap<String, String>,
}

/// Shared, cheaply clonable client configuration.
///
/// Clones are handles onto the same state, so a single `configure` call is
/// visible to every holder without reconstructing them. Writes go through
/// one lock and are all-or-nothing; readers never observe a half-updated
/// token/base-path pair.
#[derive(Clone, Debug)]
pub struct ClientContext {
    inner: Arc<RwLock<ContextInner>>,
}

impl ClientContext {
    /// Creates a context pointed at the given environment's hosts.
    pub fn new(environment: Environment) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ContextInner {
                base_path: environment.rest_base_path().to_string(),
                oauth_base_path: environment.oauth_base_path().to_string(),
                default_headers: HashMap::new(),
            })),
        }
    }

    pub fn base_path(&self) -> String {
        self.read().base_path.clone()
    }

    /// The OAuth host derived from the current base path.
    pub fn oauth_base_path(&self) -> String {
        self.read().oauth_base_path.clone()
    }

    /// Sets the REST base path.
    ///
    /// When the host belongs to a known environment the OAuth host is
    /// recomputed to match; a custom host keeps the previous OAuth host.
    pub fn set_base_path(&self, base_path: impl Into<String>) {
        let base_path = base_path.into();
        let derived = Environment::from_rest_base_path(&base_path)
            .map(|env| env.oauth_base_path().to_string());
        let mut inner = self.write();
        inner.base_path = base_path;
        if let Some(oauth_base_path) = derived {
            inner.oauth_base_path = oauth_base_path;
        }
    }

    pub fn add_default_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.write().default_headers.insert(name.into(), value.into());
    }

    pub fn default_header(&self, name: &str) -> Option<String> {
        self.read().default_headers.get(name).cloned()
    }

    /// The current `Authorization` default header, if configured.
    pub fn authorization(&self) -> Option<String> {
        self.default_header(AUTHORIZATION_HEADER)
    }

    /// Applies a resolved token and base path in one step.
    ///
    /// Validation happens before the write lock is taken, so a failed call
    /// leaves the context untouched. The `Authorization` header replaces any
    /// prior value.
    pub fn configure(&self, token: &TokenResponse, base_path: &str) -> Result<(), Error> {
        if token.access_token.is_empty() {
            return Err(Error::MissingConfig("access_token"));
        }
        if base_path.is_empty() {
            return Err(Error::MissingConfig("base_path"));
        }
        let derived = Environment::from_rest_base_path(base_path)
            .map(|env| env.oauth_base_path().to_string());
        let mut inner = self.write();
        inner.base_path = base_path.to_string();
        if let Some(oauth_base_path) = derived {
            inner.oauth_base_path = oauth_base_path;
        }
        inner.default_headers.insert(
            AUTHORIZATION_HEADER.to_string(),
            format!("Bearer {}", token.access_token),
        );
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ContextInner> {
        self.inner.read().expect("client context lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ContextInner> {
        self.inner.write().expect("client context lock poisoned")
    }
}
