use std::env;

use anyhow::{Context, Result, bail};
use chrono::Duration;
use dotenvy::dotenv;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Administrator account created at startup when absent.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub exclusive_pending: bool,
    pub admin: Option<AdminBootstrap>,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load configuration from environment variables (and `.env` when present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let dev = lookup("AGORA_ENV").is_some_and(|v| v == "dev");
        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ if dev => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
            _ => bail!("JWT_SECRET must be set (or AGORA_ENV=dev for a development default)"),
        };

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (None, None) => None,
            _ => bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            jwt_secret,
            access_token_ttl: Duration::minutes(
                parse_or(lookup("ACCESS_TOKEN_TTL_MINUTES"), 30)
                    .context("ACCESS_TOKEN_TTL_MINUTES must be a whole number of minutes")?,
            ),
            refresh_token_ttl: Duration::days(
                parse_or(lookup("REFRESH_TOKEN_TTL_DAYS"), 30)
                    .context("REFRESH_TOKEN_TTL_DAYS must be a whole number of days")?,
            ),
            database_url: lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()),
            database_max_connections: parse_or(lookup("DATABASE_MAX_CONNECTIONS"), 10)
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            exclusive_pending: parse_or(lookup("AFFILIATION_EXCLUSIVE_PENDING"), false)
                .context("AFFILIATION_EXCLUSIVE_PENDING must be true or false")?,
            admin,
            bcrypt_cost: parse_or(lookup("BCRYPT_COST"), agora_auth::password::DEFAULT_COST)
                .context("BCRYPT_COST must be a valid number")?,
        })
    }

    /// In-memory configuration with a fixed secret and the cheapest hash cost.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: jwt_secret.into(),
            access_token_ttl: Duration::minutes(30),
            refresh_token_ttl: Duration::days(30),
            database_url: None,
            database_max_connections: 1,
            exclusive_pending: false,
            admin: None,
            bcrypt_cost: 4,
        }
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => Ok(raw.trim().parse::<T>()?),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.access_token_ttl, Duration::minutes(30));
        assert_eq!(config.refresh_token_ttl, Duration::days(30));
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 10);
        assert!(!config.exclusive_pending);
        assert!(config.admin.is_none());
        assert_eq!(config.bcrypt_cost, agora_auth::password::DEFAULT_COST);
    }

    #[test]
    fn secret_is_required_outside_dev() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET must be set"));
        assert!(load(&[("JWT_SECRET", "   ")]).is_err());
        assert!(load(&[("AGORA_ENV", "production")]).is_err());
    }

    #[test]
    fn dev_environment_falls_back_to_the_dev_secret() {
        let config = load(&[("AGORA_ENV", "dev")]).unwrap();
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        let config = load(&[("AGORA_ENV", "dev"), ("JWT_SECRET", "mine")]).unwrap();
        assert_eq!(config.jwt_secret, "mine");
    }

    #[test]
    fn exclusive_pending_is_parsed_as_a_bool() {
        let config = load(&[("JWT_SECRET", "s"), ("AFFILIATION_EXCLUSIVE_PENDING", " true ")]).unwrap();
        assert!(config.exclusive_pending);
        let config = load(&[("JWT_SECRET", "s"), ("AFFILIATION_EXCLUSIVE_PENDING", "false")]).unwrap();
        assert!(!config.exclusive_pending);

        let err = load(&[("JWT_SECRET", "s"), ("AFFILIATION_EXCLUSIVE_PENDING", "yes")]).unwrap_err();
        assert!(err.to_string().contains("AFFILIATION_EXCLUSIVE_PENDING must be true or false"));
    }

    #[test]
    fn numeric_overrides_are_validated() {
        let config = load(&[
            ("JWT_SECRET", "s"),
            ("ACCESS_TOKEN_TTL_MINUTES", "5"),
            ("REFRESH_TOKEN_TTL_DAYS", "7"),
            ("DATABASE_URL", "postgres://localhost/agora"),
            ("BCRYPT_COST", "6"),
        ])
        .unwrap();
        assert_eq!(config.access_token_ttl, Duration::minutes(5));
        assert_eq!(config.refresh_token_ttl, Duration::days(7));
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/agora"));
        assert_eq!(config.bcrypt_cost, 6);

        assert!(load(&[("JWT_SECRET", "s"), ("ACCESS_TOKEN_TTL_MINUTES", "soon")]).is_err());
        assert!(load(&[("JWT_SECRET", "s"), ("DATABASE_MAX_CONNECTIONS", "-1")]).is_err());
    }

    #[test]
    fn admin_credentials_come_in_pairs() {
        let config = load(&[
            ("JWT_SECRET", "s"),
            ("ADMIN_EMAIL", "root@x.io"),
            ("ADMIN_PASSWORD", "Passw0rdX"),
        ])
        .unwrap();
        assert_eq!(config.admin.map(|a| a.email), Some("root@x.io".to_string()));
        assert!(load(&[("JWT_SECRET", "s"), ("ADMIN_EMAIL", "root@x.io")]).is_err());
        assert!(load(&[("JWT_SECRET", "s"), ("ADMIN_PASSWORD", "Passw0rdX")]).is_err());
    }
}
