use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::Error;

/// Upper bound the authorization server accepts for assertion lifetimes.
pub(crate) const MAX_EXPIRES_IN_SECS: u64 = 3600;

/// How much validity must remain on an assertion for the transport retry to
/// reuse it instead of failing the attempt.
pub(crate) const RETRY_VALIDITY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<&'a str>,
    aud: &'a str,
    iat: i64,
    exp: i64,
    scope: String,
}

/// Signed JWT grant assertion. Single-use; never persisted.
#[derive(Debug, Clone)]
pub struct Assertion {
    jwt: String,
    expiry_time: i64,
}

impl Assertion {
    /// The encoded compact JWT.
    pub fn as_str(&self) -> &str {
        &self.jwt
    }

    /// Unix timestamp of the embedded `exp` claim.
    pub fn expiry_time(&self) -> i64 {
        self.expiry_time
    }

    /// Whether the assertion remains valid for at least `margin` from now.
    pub fn valid_for(&self, margin: Duration) -> bool {
        unix_time_now() + margin.as_secs() as i64 <= self.expiry_time
    }
}

/// Builds a signed, time-bounded grant assertion. Pure; performs no I/O.
///
/// `subject_user_id` is omitted for application-level grants. `audience` is
/// the authorization server host, without a scheme.
pub fn build_assertion(
    integrator_key: &str,
    subject_user_id: Option<&str>,
    scopes: &[String],
    private_key_pem: &[u8],
    expires_in_secs: u64,
    audience: &str,
) -> Result<Assertion, Error> {
    if scopes.is_empty() {
        return Err(Error::EmptyScopes);
    }
    if expires_in_secs == 0 || expires_in_secs > MAX_EXPIRES_IN_SECS {
        return Err(Error::InvalidExpiry(expires_in_secs));
    }
    let key =
        EncodingKey::from_rsa_pem(private_key_pem).map_err(|e| Error::InvalidKey(e.to_string()))?;

    let now = unix_time_now();
    let expiry_time = now + expires_in_secs as i64;
    let claims = GrantClaims {
        iss: integrator_key,
        sub: subject_user_id,
        aud: audience,
        iat: now,
        exp: expiry_time,
        scope: scopes.join(" "),
    };
    let jwt = encode(&Header::new(Algorithm::RS256), &claims, &key)?;
    Ok(Assertion { jwt, expiry_time })
}

pub(crate) fn unix_time_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;

    const TEST_KEY_PEM: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/test_rsa_key.pem"));

    fn scopes() -> Vec<String> {
        vec!["signature".to_string(), "impersonation".to_string()]
    }

    fn decode_claims(jwt: &str) -> serde_json::Value {
        let payload = jwt.split('.').nth(1).expect("payload segment");
        let bytes = URL_SAFE_NO_PAD.decode(payload).expect("base64 payload");
        serde_json::from_slice(&bytes).expect("claims json")
    }

    #[test]
    fn builds_user_assertion_with_expected_claims() {
        let assertion = build_assertion(
            "IK1",
            Some("U1"),
            &scopes(),
            TEST_KEY_PEM.as_bytes(),
            3600,
            "account-d.esign.com",
        )
        .expect("assertion");

        assert_eq!(assertion.as_str().split('.').count(), 3);
        let claims = decode_claims(assertion.as_str());
        assert_eq!(claims["iss"], "IK1");
        assert_eq!(claims["sub"], "U1");
        assert_eq!(claims["aud"], "account-d.esign.com");
        assert_eq!(claims["scope"], "signature impersonation");
        let iat = claims["iat"].as_i64().expect("iat");
        let exp = claims["exp"].as_i64().expect("exp");
        assert_eq!(exp - iat, 3600);
        assert_eq!(assertion.expiry_time(), exp);
    }

    #[test]
    fn application_assertion_has_no_subject() {
        let assertion = build_assertion(
            "IK1",
            None,
            &scopes(),
            TEST_KEY_PEM.as_bytes(),
            600,
            "account-d.esign.com",
        )
        .expect("assertion");
        let claims = decode_claims(assertion.as_str());
        assert!(claims.get("sub").is_none());
    }

    #[test]
    fn malformed_key_fails_with_invalid_key() {
        let err = build_assertion(
            "IK1",
            Some("U1"),
            &scopes(),
            b"not a pem key",
            3600,
            "account-d.esign.com",
        )
        .expect_err("bad key");
        assert!(matches!(err, Error::InvalidKey(_)));
    }

    #[test]
    fn empty_scopes_fail() {
        let err = build_assertion(
            "IK1",
            Some("U1"),
            &[],
            TEST_KEY_PEM.as_bytes(),
            3600,
            "account-d.esign.com",
        )
        .expect_err("empty scopes");
        assert!(matches!(err, Error::EmptyScopes));
    }

    #[test]
    fn out_of_range_expiry_fails() {
        for expires_in in [0, MAX_EXPIRES_IN_SECS + 1] {
            let err = build_assertion(
                "IK1",
                Some("U1"),
                &scopes(),
                TEST_KEY_PEM.as_bytes(),
                expires_in,
                "account-d.esign.com",
            )
            .expect_err("bad expiry");
            assert!(matches!(err, Error::InvalidExpiry(got) if got == expires_in));
        }
    }

    #[test]
    fn fresh_assertion_is_valid_for_retry_margin() {
        let assertion = build_assertion(
            "IK1",
            Some("U1"),
            &scopes(),
            TEST_KEY_PEM.as_bytes(),
            3600,
            "account-d.esign.com",
        )
        .expect("assertion");
        assert!(assertion.valid_for(RETRY_VALIDITY_MARGIN));
        assert!(!assertion.valid_for(Duration::from_secs(MAX_EXPIRES_IN_SECS + 60)));
    }
}
