//! The authenticated session handle.
//!
//! A [`Session`] is the auth service's proof of authentication: an access
//! token plus the user it was issued for. It is an explicit value passed into
//! every flow that needs identity, never ambient state. The CLI persists it as
//! JSON in the working directory between invocations.

use std::fs;
use std::path::Path;

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Where the CLI keeps the current session between invocations.
pub const SESSION_FILE: &str = ".skillspot_session";

/// The auth-service user a session was issued for. The service may omit the
/// email for accounts created through other identity providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

/// Claims carried by the access token.
#[derive(Debug, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
}

impl Session {
    /// The verified email this session was issued for.
    pub fn email(&self) -> Result<&str, Error> {
        self.user
            .email
            .as_deref()
            .ok_or_else(|| Error::Auth("session has no verified email".to_string()))
    }

    /// Decodes the access-token claims without verifying the signature. The
    /// client never holds the signing secret; the claims only serve local
    /// expiry checks on a session restored from disk.
    pub fn claims(&self) -> Result<TokenClaims, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        decode::<TokenClaims>(&self.access_token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|err| Error::Auth(format!("invalid session token: {err}")))
    }

    /// Whether the access token's `exp` claim has passed. An undecodable token
    /// counts as expired.
    pub fn is_expired(&self) -> bool {
        match self.claims() {
            Ok(claims) => claims.exp <= Utc::now().timestamp(),
            Err(_) => true,
        }
    }
}

/// Persists the session for later invocations.
pub fn save(session: &Session, path: &Path) -> Result<(), Error> {
    let json = serde_json::to_string(session)
        .map_err(|err| Error::Auth(format!("could not encode session: {err}")))?;
    fs::write(path, json).map_err(|err| Error::Auth(format!("could not save session: {err}")))
}

/// Restores a persisted session, rejecting expired tokens locally before any
/// network call.
pub fn load(path: &Path) -> Result<Session, Error> {
    let raw = fs::read_to_string(path)
        .map_err(|_| Error::Auth("Not logged in. Please log in first.".to_string()))?;
    let session: Session = serde_json::from_str(&raw)
        .map_err(|err| Error::Auth(format!("corrupt session file: {err}")))?;
    if session.is_expired() {
        return Err(Error::Auth(
            "Session expired. Please log in again.".to_string(),
        ));
    }
    Ok(session)
}

/// Drops the persisted session, if any.
pub fn clear(path: &Path) {
    let _ = fs::remove_file(path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        email: String,
        exp: i64,
    }

    fn session_with_exp(exp: i64) -> Session {
        let claims = Claims {
            sub: "4f1c18a2-5e3a-4a1d-9d3b-2f6f0c9a7e51".to_string(),
            email: "dana@students.test".to_string(),
            exp,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encode test token");
        Session {
            access_token: token,
            refresh_token: None,
            user: AuthUser {
                id: Uuid::parse_str("4f1c18a2-5e3a-4a1d-9d3b-2f6f0c9a7e51").expect("uuid"),
                email: Some("dana@students.test".to_string()),
            },
        }
    }

    #[test]
    fn claims_decode_without_the_signing_secret() {
        let session = session_with_exp(Utc::now().timestamp() + 3600);
        let claims = session.claims().expect("claims should decode");
        assert_eq!(claims.email.as_deref(), Some("dana@students.test"));
    }

    #[test]
    fn expiry_is_checked_locally() {
        assert!(!session_with_exp(Utc::now().timestamp() + 3600).is_expired());
        assert!(session_with_exp(Utc::now().timestamp() - 10).is_expired());
    }

    #[test]
    fn garbage_token_counts_as_expired() {
        let mut session = session_with_exp(Utc::now().timestamp() + 3600);
        session.access_token = "not-a-token".to_string();
        assert!(session.is_expired());
    }

    #[test]
    fn expired_session_file_is_rejected_on_load() {
        let path = std::env::temp_dir().join("skillspot_test_expired_session");
        let session = session_with_exp(Utc::now().timestamp() - 10);
        save(&session, &path).expect("save");
        let err = load(&path).expect_err("expired session should not load");
        assert!(matches!(err, Error::Auth(_)));
        clear(&path);
    }

    #[test]
    fn session_round_trips_through_the_file() {
        let path = std::env::temp_dir().join("skillspot_test_session_roundtrip");
        let session = session_with_exp(Utc::now().timestamp() + 3600);
        save(&session, &path).expect("save");
        let restored = load(&path).expect("load");
        assert_eq!(restored.email().expect("email"), "dana@students.test");
        clear(&path);
        assert!(load(&path).is_err());
    }
}
