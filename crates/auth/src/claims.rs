use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// Access tokens authorize API calls; refresh tokens only mint new access tokens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Bearer token claims (transport-agnostic).
///
/// Timestamps use the registered `iat`/`exp` claim names as seconds since the
/// epoch so standard JWT tooling can read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account email; the identity key.
    pub email: String,

    pub role: Role,

    pub kind: TokenKind,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("expected a {expected:?} token")]
    WrongKind { expected: TokenKind },

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Deterministically validate token claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// happens in [`crate::jwt`].
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(issued_at: DateTime<Utc>, ttl: Duration) -> TokenClaims {
        TokenClaims {
            email: "agent@example.com".to_string(),
            role: Role::Agent,
            kind: TokenKind::Access,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn accepts_token_inside_window() {
        let now = Utc::now();
        assert!(validate_claims(&claims(now, Duration::minutes(30)), now).is_ok());
    }

    #[test]
    fn rejects_expired_and_future_tokens() {
        let now = Utc::now();
        let c = claims(now - Duration::hours(1), Duration::minutes(30));
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::Expired));

        let c = claims(now + Duration::minutes(5), Duration::minutes(30));
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let c = claims(now, Duration::zero());
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn serializes_registered_claim_names() {
        let now = Utc::now();
        let json = serde_json::to_value(claims(now, Duration::minutes(1))).unwrap();
        assert_eq!(json["iat"].as_i64(), Some(now.timestamp()));
        assert_eq!(json["role"], "agent");
        assert_eq!(json["kind"], "access");
    }
}
