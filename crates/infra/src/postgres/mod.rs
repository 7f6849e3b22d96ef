//! Postgres-backed store.
//!
//! ## Error mapping
//!
//! | sqlx error | Postgres code | `StoreError` |
//! |---|---|---|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (foreign key / check violation) | `23503` / `23514` | `Corrupt` |
//! | Database (other) | any | `Unavailable` |
//! | Row decode | n/a | `Corrupt` |
//! | Pool closed, IO, TLS, timeouts | n/a | `Unavailable` |
//!
//! ## Transactions
//!
//! [`PostgresStore::begin`] opens a `READ COMMITTED` transaction. Inside it the
//! agent and request rows are read with `SELECT ... FOR UPDATE`, so workflow
//! transactions touching the same agent queue behind each other. The partial
//! unique index `approval_requests_pending_pair` backs the pending-request rule
//! even if a caller skips the lookup.
//!
//! Registration runs in its own transaction: it claims the email in
//! `account_emails` (shared by every account kind), then writes the account and
//! its profile. A concurrent claim of the same email blocks on the primary key
//! and fails once the first transaction commits.

mod accounts;
mod rows;
mod tx;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use agora_affiliation::{AffiliationStore, AffiliationTx};
use agora_core::{AgentId, DistributorId, Email, PurchaseId, StoreError, StoreResult};
use agora_identity::{Account, Agent, Distributor, IdentityStore, InsuranceCompany, Profile};
use agora_purchasing::{Purchase, PurchaseStore};

pub use tx::PostgresTx;

const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// sqlx/Postgres implementation of every store trait.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool of at most `max_connections` to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes that do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                Some("23503") | Some("23514") => StoreError::Corrupt(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        e @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_)) => {
            StoreError::corrupt(format!("{operation}: {e}"))
        }
        other => StoreError::unavailable(format!("{operation}: {other}")),
    }
}

pub(crate) fn uuid_opt<T: Into<uuid::Uuid>>(id: Option<T>) -> Option<uuid::Uuid> {
    id.map(Into::into)
}

/// Name of the unique constraint `err` violated, if it is a unique violation.
pub(crate) fn violated_unique_constraint(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            Some(db_err.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

#[async_trait]
impl IdentityStore for PostgresStore {
    #[instrument(skip_all, fields(role = %account.role()), err)]
    async fn register_account(&self, account: &Account, profile: &Profile) -> StoreResult<()> {
        accounts::register(&self.pool, account, profile).await
    }

    async fn find_agent(&self, id: AgentId) -> StoreResult<Option<Agent>> {
        let sql = format!("SELECT {} FROM agents WHERE id = $1", rows::AGENT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_agent", e))?;
        row.as_ref().map(rows::agent).transpose()
    }

    async fn find_agent_by_email(&self, email: &Email) -> StoreResult<Option<Agent>> {
        let sql = format!("SELECT {} FROM agents WHERE email = $1", rows::AGENT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_agent_by_email", e))?;
        row.as_ref().map(rows::agent).transpose()
    }

    async fn list_agents(&self) -> StoreResult<Vec<Agent>> {
        let sql = format!("SELECT {} FROM agents ORDER BY created_at, id", rows::AGENT_COLUMNS);
        let found = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_agents", e))?;
        rows::all(&found, rows::agent)
    }

    async fn list_agents_for_distributor(&self, id: DistributorId) -> StoreResult<Vec<Agent>> {
        let sql = format!(
            "SELECT {} FROM agents WHERE distributor_id = $1 ORDER BY created_at, id",
            rows::AGENT_COLUMNS
        );
        let found = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_agents_for_distributor", e))?;
        rows::all(&found, rows::agent)
    }

    async fn find_distributor(&self, id: DistributorId) -> StoreResult<Option<Distributor>> {
        let sql = format!("SELECT {} FROM distributors WHERE id = $1", rows::DISTRIBUTOR_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_distributor", e))?;
        row.as_ref().map(rows::distributor).transpose()
    }

    async fn find_distributor_by_email(&self, email: &Email) -> StoreResult<Option<Distributor>> {
        let sql = format!("SELECT {} FROM distributors WHERE email = $1", rows::DISTRIBUTOR_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_distributor_by_email", e))?;
        row.as_ref().map(rows::distributor).transpose()
    }

    async fn find_distributor_by_business_name(&self, name: &str) -> StoreResult<Option<Distributor>> {
        let sql = format!(
            "SELECT {} FROM distributors WHERE business_name = $1",
            rows::DISTRIBUTOR_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_distributor_by_business_name", e))?;
        row.as_ref().map(rows::distributor).transpose()
    }

    async fn list_distributors(&self) -> StoreResult<Vec<Distributor>> {
        let sql = format!(
            "SELECT {} FROM distributors ORDER BY created_at, id",
            rows::DISTRIBUTOR_COLUMNS
        );
        let found = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_distributors", e))?;
        rows::all(&found, rows::distributor)
    }

    async fn find_insurance_company_by_email(&self, email: &Email) -> StoreResult<Option<InsuranceCompany>> {
        let sql = format!(
            "SELECT {} FROM insurance_companies WHERE email = $1",
            rows::INSURANCE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_insurance_company_by_email", e))?;
        row.as_ref().map(rows::insurance_company).transpose()
    }

    async fn find_profile_by_email(&self, email: &Email) -> StoreResult<Option<Profile>> {
        let sql = format!("SELECT {} FROM profiles WHERE email = $1", rows::PROFILE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_profile_by_email", e))?;
        row.as_ref().map(rows::profile).transpose()
    }
}

#[async_trait]
impl PurchaseStore for PostgresStore {
    #[instrument(skip_all, fields(purchase_id = %purchase.id), err)]
    async fn insert_purchase(&self, purchase: &Purchase) -> StoreResult<()> {
        let sql = format!(
            "INSERT INTO purchases ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
            rows::PURCHASE_COLUMNS
        );
        sqlx::query(&sql)
            .bind(purchase.id.as_uuid())
            .bind(&purchase.firstname)
            .bind(&purchase.lastname)
            .bind(purchase.email.as_str())
            .bind(&purchase.phone_number)
            .bind(&purchase.product_category)
            .bind(&purchase.product)
            .bind(&purchase.receipt_image)
            .bind(&purchase.product_image)
            .bind(purchase.purchase_status.as_str())
            .bind(purchase.purchase_date)
            .bind(&purchase.purchase_secret)
            .bind(purchase.agent_id.as_uuid())
            .bind(uuid_opt(purchase.distributor_id))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_purchase", e))?;
        Ok(())
    }

    async fn find_purchase(&self, id: PurchaseId) -> StoreResult<Option<Purchase>> {
        let sql = format!("SELECT {} FROM purchases WHERE id = $1", rows::PURCHASE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_purchase", e))?;
        row.as_ref().map(rows::purchase).transpose()
    }

    async fn list_purchases(&self) -> StoreResult<Vec<Purchase>> {
        let sql = format!(
            "SELECT {} FROM purchases ORDER BY purchase_date, id",
            rows::PURCHASE_COLUMNS
        );
        let found = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_purchases", e))?;
        rows::all(&found, rows::purchase)
    }
}

#[async_trait]
impl AffiliationStore for PostgresStore {
    async fn begin(&self) -> StoreResult<Box<dyn AffiliationTx>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;
        Ok(Box::new(PostgresTx::new(tx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_declares_pending_pair_index() {
        assert!(SCHEMA.contains("approval_requests_pending_pair"));
        assert!(SCHEMA.contains("WHERE status = 'pending'"));
    }

    #[test]
    fn schema_claims_emails_across_account_kinds() {
        assert!(SCHEMA.contains("CREATE TABLE IF NOT EXISTS account_emails"));
        assert!(SCHEMA.contains("email           TEXT PRIMARY KEY"));
        for table in ["agents", "distributors", "insurance_companies"] {
            assert!(SCHEMA.contains(&format!("FROM {table}\n    ON CONFLICT (email) DO NOTHING")));
        }
    }

    #[test]
    fn only_unique_violations_name_a_constraint() {
        assert!(violated_unique_constraint(&sqlx::Error::PoolClosed).is_none());
        assert!(violated_unique_constraint(&sqlx::Error::RowNotFound).is_none());
    }

    #[test]
    fn non_database_errors_are_unavailable() {
        let err = map_sqlx_error("find_agent", sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::Unavailable(msg) if msg.starts_with("find_agent")));
    }

    #[test]
    fn row_not_found_is_unavailable() {
        let err = map_sqlx_error("find_agent", sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
