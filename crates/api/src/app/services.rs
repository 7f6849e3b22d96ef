//! Store and service wiring.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use agora_affiliation::{AffiliationStore, AffiliationWorkflow, WorkflowOptions};
use agora_auth::{PasswordHasher, TokenIssuer};
use agora_core::Email;
use agora_identity::{IdentityStore, accounts};
use agora_infra::{InMemoryStore, PostgresStore};
use agora_purchasing::PurchaseStore;

use crate::config::Config;

/// Everything handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub identity: Arc<dyn IdentityStore>,
    pub purchases: Arc<dyn PurchaseStore>,
    pub affiliation: AffiliationWorkflow<dyn AffiliationStore>,
    pub hasher: PasswordHasher,
    pub tokens: TokenIssuer,
}

impl AppServices {
    fn from_backend<B>(backend: Arc<B>, config: &Config) -> Self
    where
        B: IdentityStore + PurchaseStore + AffiliationStore + 'static,
    {
        let identity: Arc<dyn IdentityStore> = backend.clone();
        let purchases: Arc<dyn PurchaseStore> = backend.clone();
        let affiliation_store: Arc<dyn AffiliationStore> = backend;
        Self {
            identity,
            purchases,
            affiliation: AffiliationWorkflow::new(
                affiliation_store,
                WorkflowOptions {
                    exclusive_pending: config.exclusive_pending,
                },
            ),
            hasher: PasswordHasher::with_cost(config.bcrypt_cost),
            tokens: TokenIssuer::new(
                config.jwt_secret.as_bytes(),
                config.access_token_ttl,
                config.refresh_token_ttl,
            ),
        }
    }
}

/// Pick the storage backend from `config` and wire services on top of it.
pub async fn build_services(config: &Config) -> Result<AppServices> {
    let services = match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to DATABASE_URL")?;
            store
                .ensure_schema()
                .await
                .context("failed to apply database schema")?;
            tracing::info!("using postgres store");
            AppServices::from_backend(Arc::new(store), config)
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory store");
            AppServices::from_backend(Arc::new(InMemoryStore::new()), config)
        }
    };

    if let Some(admin) = &config.admin {
        let email = Email::parse(&admin.email)
            .map_err(|msg| anyhow::anyhow!("ADMIN_EMAIL: {msg}"))?;
        accounts::bootstrap_admin(
            services.identity.as_ref(),
            &services.hasher,
            &email,
            &admin.password,
            Utc::now(),
        )
        .await
        .context("failed to bootstrap administrator")?;
    }

    Ok(services)
}
