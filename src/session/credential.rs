//! Credential lifecycle and access-token payload decoding.
//!
//! The Netw API issues JWT access tokens. The console never verifies their
//! signature (it holds no key); it only reads the identity claims so the
//! console can show who is logged in. Anything that fails to decode yields
//! no user rather than an error at the call site.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::ApiEnvelope;

/// Access/refresh token pair with independent expiries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl Credential {
    /// Build a credential from an auth response received at `now`.
    ///
    /// The access lifetime is `access_ttl`, shortened to the server's
    /// `expiresIn` when that is positive and smaller.
    pub fn issue(
        response: &AuthResponse,
        now: DateTime<Utc>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        let access_ttl = match response.expires_in {
            Some(secs) if secs > 0 && Duration::seconds(secs) < access_ttl => Duration::seconds(secs),
            _ => access_ttl,
        };

        Self {
            access_token: response.token.clone(),
            refresh_token: response.refresh_token.clone(),
            access_expires_at: expiry(now, access_ttl),
            refresh_expires_at: expiry(now, refresh_ttl),
        }
    }

    /// Access token, unless it has expired
    pub fn live_access_token(&self, now: DateTime<Utc>) -> Option<&str> {
        if self.access_token.is_empty() || now >= self.access_expires_at {
            None
        } else {
            Some(&self.access_token)
        }
    }

    /// Refresh token, unless it has expired
    pub fn live_refresh_token(&self, now: DateTime<Utc>) -> Option<&str> {
        if self.refresh_token.is_empty() || now >= self.refresh_expires_at {
            None
        } else {
            Some(&self.refresh_token)
        }
    }
}

// Saturates instead of overflowing on huge lifetimes
fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Body of `POST /Auth/AuthUser` and `POST /Auth/refreshToken`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

// Auth bodies arrive bare or inside the standard envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AuthBody {
    Wrapped(ApiEnvelope<AuthResponse>),
    Bare(AuthResponse),
}

impl AuthBody {
    pub(crate) fn into_response(self) -> Result<AuthResponse, String> {
        let response = match self {
            AuthBody::Bare(response) => response,
            AuthBody::Wrapped(envelope) if envelope.success => match envelope.data {
                Some(response) => response,
                None => return Err("response carried no token".to_string()),
            },
            AuthBody::Wrapped(envelope) => return Err(envelope.failure_message()),
        };

        if response.token.is_empty() {
            return Err("response carried an empty token".to_string());
        }
        Ok(response)
    }
}

/// Identity carried in the access token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub rights: Vec<String>,
}

impl SessionUser {
    pub fn has_right(&self, right: &str) -> bool {
        self.rights.iter().any(|r| r == right)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenDecodeError {
    #[error("token is not a JWT (expected 3 segments, found {0})")]
    NotAJwt(usize),

    #[error("token payload could not be decoded: {0}")]
    InvalidPayload(String),
}

/// Decode the identity claims of an access token without verifying it.
///
/// Claims are read from `payload.data` first, then from the payload root.
pub fn decode_session_user(token: &str) -> Result<SessionUser, TokenDecodeError> {
    let segments = token.split('.').count();
    if segments != 3 {
        return Err(TokenDecodeError::NotAJwt(segments));
    }

    // Header and signature are the server's business; only the payload is read
    let encoded: String = token
        .split('.')
        .nth(1)
        .unwrap_or_default()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.as_bytes())
        .map_err(|e| TokenDecodeError::InvalidPayload(e.to_string()))?;
    let payload: Value =
        serde_json::from_slice(&bytes).map_err(|e| TokenDecodeError::InvalidPayload(e.to_string()))?;
    if !payload.is_object() {
        return Err(TokenDecodeError::InvalidPayload("payload is not an object".to_string()));
    }

    Ok(SessionUser {
        user_id: string_claim(&payload, "userId"),
        user_name: string_claim(&payload, "userName"),
        email: string_claim(&payload, "email"),
        rights: rights_claim(&payload),
    })
}

fn claim<'a>(payload: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    let nested = payload.get("data").and_then(|data| data.get(key));
    let root = payload.get(key);
    nested.into_iter().chain(root)
}

fn string_claim(payload: &Value, key: &str) -> String {
    claim(payload, key)
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

fn rights_claim(payload: &Value) -> Vec<String> {
    claim(payload, "rights")
        .find_map(|value| value.as_array())
        .map(|rights| {
            rights
                .iter()
                .filter_map(|r| r.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::jwt_with_payload;
    use serde_json::json;

    #[test]
    fn reads_nested_data_claims() {
        let token = jwt_with_payload(json!({
            "data": {
                "userId": 17,
                "userName": "agence-lyon",
                "email": "lyon@reseller.fr",
                "rights": ["admin", "read"]
            },
            "exp": 4102444800u64
        }));

        let user = decode_session_user(&token).unwrap();
        assert_eq!(user.user_id, "17");
        assert_eq!(user.user_name, "agence-lyon");
        assert_eq!(user.email, "lyon@reseller.fr");
        assert!(user.has_right("admin"));
    }

    #[test]
    fn falls_back_to_root_claims() {
        let token = jwt_with_payload(json!({
            "data": { "userName": "" },
            "userId": "u-1",
            "userName": "root-name"
        }));

        let user = decode_session_user(&token).unwrap();
        assert_eq!(user.user_id, "u-1");
        assert_eq!(user.user_name, "root-name");
        assert_eq!(user.email, "");
        assert!(user.rights.is_empty());
    }

    #[test]
    fn malformed_tokens_are_decode_errors() {
        for token in [
            "",
            "test-token",
            "a.b",
            "a.b.c.d",
            "###.$$$.%%%",
            "eyJhbGciOiJIUzI1NiJ9.bm90LWpzb24.c2ln",
        ] {
            assert!(decode_session_user(token).is_err(), "token {:?} should not decode", token);
        }
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let token = jwt_with_payload(json!(["userId"]));
        assert!(decode_session_user(&token).is_err());
    }

    #[test]
    fn header_algorithm_does_not_matter() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"data":{"userName":"bob"}}"#);
        for header in [r#"{"alg":"none"}"#, r#"{"typ":"JWT"}"#, r#"{"alg":"RS256"}"#] {
            let token = format!("{}.{}.", URL_SAFE_NO_PAD.encode(header), payload);
            let user = decode_session_user(&token).unwrap();
            assert_eq!(user.user_name, "bob", "header {}", header);
        }
    }

    #[test]
    fn padded_payload_segment_decodes() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"userName":"al"}"#);
        assert!(payload.ends_with('='));
        let token = format!("e30.{}.sig", payload);
        assert_eq!(decode_session_user(&token).unwrap().user_name, "al");
    }

    #[test]
    fn issue_honours_shorter_server_expiry() {
        let now = Utc::now();
        let response = AuthResponse {
            token: "a".into(),
            refresh_token: "r".into(),
            expires_in: Some(3600),
        };

        let credential = Credential::issue(&response, now, Duration::hours(24), Duration::days(7));
        assert_eq!(credential.access_expires_at, now + Duration::hours(1));
        assert_eq!(credential.refresh_expires_at, now + Duration::days(7));
        assert_eq!(credential.live_access_token(now), Some("a"));
        assert_eq!(credential.live_access_token(now + Duration::hours(2)), None);
        assert_eq!(credential.live_refresh_token(now + Duration::hours(2)), Some("r"));
    }

    #[test]
    fn issue_saturates_huge_lifetimes() {
        let now = Utc::now();
        let response = AuthResponse {
            token: "a".into(),
            refresh_token: "r".into(),
            expires_in: None,
        };

        let credential = Credential::issue(&response, now, Duration::MAX, Duration::MAX);
        assert_eq!(credential.access_expires_at, DateTime::<Utc>::MAX_UTC);
        assert_eq!(credential.live_access_token(now), Some("a"));
    }

    #[test]
    fn auth_body_accepts_bare_and_wrapped() {
        let bare: AuthBody = serde_json::from_value(json!({
            "token": "t", "refreshToken": "r", "expiresIn": 86400
        }))
        .unwrap();
        assert_eq!(bare.into_response().unwrap().token, "t");

        let wrapped: AuthBody = serde_json::from_value(json!({
            "success": true,
            "data": { "token": "t2", "refreshToken": "r2" }
        }))
        .unwrap();
        assert_eq!(wrapped.into_response().unwrap().refresh_token, "r2");

        let rejected: AuthBody = serde_json::from_value(json!({
            "success": false,
            "error": "Identifiants invalides"
        }))
        .unwrap();
        assert_eq!(rejected.into_response().unwrap_err(), "Identifiants invalides");
    }
}
