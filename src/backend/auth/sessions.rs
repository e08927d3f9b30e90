/**
 * Store Sessions and JWT Tokens
 *
 * Bearer tokens map to a `StoreSession`: the store the caller may edit, the
 * caller's role and when the token stops being valid. Verification keeps
 * "expired" and "invalid" apart so clients can tell "log in again" from
 * "this token was never good".
 */

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Store ID the token is scoped to
    pub sub: String,
    /// Caller role, e.g. "owner" or "editor"
    #[serde(default)]
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Verified caller identity
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSession {
    pub store_id: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    #[error("missing or malformed Authorization header")]
    MissingToken,

    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Create a token for `store_id` valid for `ttl`
pub fn create_token(
    secret: &str,
    store_id: &str,
    role: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: store_id.to_string(),
        role: role.to_string(),
        exp: (now + ttl).timestamp().max(0) as u64,
        iat: now.timestamp().max(0) as u64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token and turn its claims into a session
pub fn verify_token(secret: &str, token: &str) -> Result<StoreSession, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &key, &Validation::default()).map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid(e.to_string()),
        }
    })?;

    let claims = token_data.claims;
    if claims.sub.trim().is_empty() {
        return Err(AuthError::Invalid("token has no store id".to_string()));
    }
    let expires_at = Utc
        .timestamp_opt(claims.exp as i64, 0)
        .single()
        .ok_or_else(|| AuthError::Invalid("expiry out of range".to_string()))?;

    Ok(StoreSession {
        store_id: claims.sub,
        role: claims.role,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_create_and_verify_token() {
        let token = create_token(SECRET, "store-1", "owner", Duration::hours(1)).unwrap();
        let session = verify_token(SECRET, &token).unwrap();

        assert_eq!(session.store_id, "store-1");
        assert_eq!(session.role, "owner");
        assert!(session.expires_at > Utc::now());
    }

    #[test]
    fn test_expired_token_is_distinct_from_invalid() {
        let token = create_token(SECRET, "store-1", "owner", Duration::hours(-2)).unwrap();
        assert_eq!(verify_token(SECRET, &token).unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = create_token(SECRET, "store-1", "owner", Duration::hours(1)).unwrap();
        assert!(matches!(
            verify_token("other-secret", &token),
            Err(AuthError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        assert!(matches!(
            verify_token(SECRET, "invalid.token.here"),
            Err(AuthError::Invalid(_))
        ));
    }

    #[test]
    fn test_empty_store_id_is_invalid() {
        let token = create_token(SECRET, "  ", "owner", Duration::hours(1)).unwrap();
        assert!(matches!(verify_token(SECRET, &token), Err(AuthError::Invalid(_))));
    }
}
