use serde::{Deserialize, Serialize};

/// Bearer token returned by the token endpoint.
///
/// `expires_in` is the literal value reported by the server, not recomputed
/// locally.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Identity endpoint response for the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserInfo {
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub accounts: Vec<AccountInfo>,
}

/// One account the authenticated user may act in.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AccountInfo {
    pub account_id: String,
    pub account_name: Option<String>,
    pub base_uri: String,
    pub is_default: bool,
}
