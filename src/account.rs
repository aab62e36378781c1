use crate::error::Error;
use crate::models::AccountInfo;

const API_VERSION_SEGMENT: &str = "/v2";
const REST_PREFIX: &str = "/restapi";

/// Selects the effective account from the identity endpoint response.
///
/// With no explicit id the first entry in server response order wins; the
/// ordering carries no ranking semantics and `is_default` is deliberately
/// not consulted.
pub fn select_account<'a>(
    accounts: &'a [AccountInfo],
    account_id: Option<&str>,
) -> Result<&'a AccountInfo, Error> {
    match account_id {
        Some(id) => accounts
            .iter()
            .find(|account| account.account_id == id)
            .ok_or_else(|| Error::AccountNotFound(id.to_string())),
        None => accounts.first().ok_or(Error::NoAccounts),
    }
}

/// Derives the REST API base path from an account's `base_uri`.
///
/// Everything from the API-version segment onward is stripped and the fixed
/// REST prefix appended. Idempotent: a value already ending in the REST
/// prefix maps to itself.
pub fn derive_base_path(base_uri: &str) -> String {
    let root = match base_uri.find(API_VERSION_SEGMENT) {
        Some(pos) => &base_uri[..pos],
        None => base_uri,
    };
    let root = root.trim_end_matches('/');
    if root.ends_with(REST_PREFIX) {
        root.to_string()
    } else {
        format!("{root}{REST_PREFIX}")
    }
}
