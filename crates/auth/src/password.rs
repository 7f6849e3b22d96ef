//! Credential hashing (bcrypt).
//!
//! Async callers use the `*_blocking` variants, which run bcrypt on tokio's
//! blocking pool instead of a runtime worker.

use thiserror::Error;

pub use bcrypt::DEFAULT_COST;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// bcrypt hasher with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    /// Clamp `cost` into bcrypt's accepted range (4..=31).
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost: cost.clamp(4, 31),
        }
    }

    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(plain, self.cost)?)
    }

    /// `false` for mismatches and for unparseable stored hashes.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        match bcrypt::verify(plain, hash) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash could not be verified");
                false
            }
        }
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(&self, plain: &str) -> Result<String, PasswordError> {
        let hasher = *self;
        let plain = plain.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&plain)).await?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(&self, plain: &str, hash: &str) -> bool {
        let hasher = *self;
        let (plain, hash) = (plain.to_owned(), hash.to_owned());
        match tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash)).await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::error!(error = %e, "password verification task failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::with_cost(4);
        let hash = hasher.hash("Secret123").unwrap();
        assert_ne!(hash, "Secret123");
        assert!(hasher.verify("Secret123", &hash));
        assert!(!hasher.verify("secret123", &hash));
    }

    #[tokio::test]
    async fn blocking_pool_variants_agree_with_inline_ones() {
        let hasher = PasswordHasher::with_cost(4);
        let hash = hasher.hash_blocking("Secret123").await.unwrap();
        assert!(hasher.verify("Secret123", &hash));
        assert!(hasher.verify_blocking("Secret123", &hash).await);
        assert!(!hasher.verify_blocking("Secret124", &hash).await);
        assert!(!hasher.verify_blocking("Secret123", "not-a-bcrypt-hash").await);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!PasswordHasher::with_cost(4).verify("anything", "not-a-bcrypt-hash"));
    }
}
