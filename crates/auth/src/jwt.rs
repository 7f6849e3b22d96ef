//! HS256 bearer tokens: issuing and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::Serialize;
use thiserror::Error;

use crate::claims::{validate_claims, TokenClaims, TokenKind, TokenValidationError};
use crate::Role;

/// Verifies a bearer token and returns its claims.
///
/// Object-safe so the HTTP layer can hold it as `Arc<dyn JwtValidator>`.
pub trait JwtValidator: Send + Sync {
    fn validate(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, TokenValidationError>;
}

/// Shared-secret HS256 validator.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks run in `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenValidationError::Expired,
                _ => TokenValidationError::Malformed(e.to_string()),
            }
        })?;

        let claims = data.claims;
        validate_claims(&claims, now)?;
        if claims.kind != expected {
            return Err(TokenValidationError::WrongKind { expected });
        }
        Ok(claims)
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Access + refresh token pair returned on registration and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Mints HS256 tokens with fixed lifetimes per [`TokenKind`].
pub struct TokenIssuer {
    key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: impl AsRef<[u8]>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue(
        &self,
        email: &str,
        role: Role,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = TokenClaims {
            email: email.to_string(),
            role,
            kind,
            issued_at: now,
            expires_at: now + ttl,
        };
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)?)
    }

    pub fn issue_pair(&self, email: &str, role: Role, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(email, role, TokenKind::Access, now)?,
            refresh_token: self.issue(email, role, TokenKind::Refresh, now)?,
        })
    }
}
