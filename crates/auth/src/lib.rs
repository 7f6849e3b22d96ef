//! `agora-auth`: authentication and authorization boundary.
//!
//! This crate knows nothing about HTTP or storage. It knows how to
//! mint and verify bearer tokens, hash credentials, and decide whether a
//! resolved principal holds a permission. Callers supply everything else.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, require_role, AuthzError};
pub use claims::{validate_claims, TokenClaims, TokenKind, TokenValidationError};
pub use jwt::{Hs256JwtValidator, JwtValidator, TokenError, TokenIssuer, TokenPair};
pub use password::{PasswordError, PasswordHasher};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
