use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use agora_affiliation::{AffiliationTx, ApprovalRequest};
use agora_core::{AgentId, ApprovalRequestId, DistributorId, Email, StoreResult};
use agora_identity::{Agent, Distributor};

use super::{map_sqlx_error, rows};

/// Workflow transaction on one pooled connection.
///
/// Dropping it without `commit` rolls back.
pub struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

impl PostgresTx {
    pub(crate) fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl AffiliationTx for PostgresTx {
    async fn find_agent(&mut self, id: AgentId) -> StoreResult<Option<Agent>> {
        let sql = format!("SELECT {} FROM agents WHERE id = $1 FOR UPDATE", rows::AGENT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("tx.find_agent", e))?;
        row.as_ref().map(rows::agent).transpose()
    }

    async fn find_distributor(&mut self, id: DistributorId) -> StoreResult<Option<Distributor>> {
        let sql = format!("SELECT {} FROM distributors WHERE id = $1", rows::DISTRIBUTOR_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("tx.find_distributor", e))?;
        row.as_ref().map(rows::distributor).transpose()
    }

    async fn find_distributor_by_email(&mut self, email: &Email) -> StoreResult<Option<Distributor>> {
        let sql = format!("SELECT {} FROM distributors WHERE email = $1", rows::DISTRIBUTOR_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(email.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("tx.find_distributor_by_email", e))?;
        row.as_ref().map(rows::distributor).transpose()
    }

    async fn save_agent(&mut self, agent: &Agent) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE agents
            SET distributor_id = $2,
                is_approved = $3,
                is_active = $4,
                kyc_status = $5,
                phone_number = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(agent.id.as_uuid())
        .bind(agent.distributor_id.map(uuid::Uuid::from))
        .bind(agent.is_approved)
        .bind(agent.is_active)
        .bind(agent.kyc_status.as_str())
        .bind(&agent.phone_number)
        .bind(agent.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("tx.save_agent", e))?;
        Ok(())
    }

    async fn find_request(&mut self, id: ApprovalRequestId) -> StoreResult<Option<ApprovalRequest>> {
        let sql = format!(
            "SELECT {} FROM approval_requests WHERE id = $1 FOR UPDATE",
            rows::REQUEST_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("tx.find_request", e))?;
        row.as_ref().map(rows::approval_request).transpose()
    }

    async fn find_pending_request(
        &mut self,
        agent_id: AgentId,
        distributor_id: DistributorId,
    ) -> StoreResult<Option<ApprovalRequest>> {
        let sql = format!(
            "SELECT {} FROM approval_requests \
             WHERE agent_id = $1 AND distributor_id = $2 AND status = 'pending'",
            rows::REQUEST_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(agent_id.as_uuid())
            .bind(distributor_id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("tx.find_pending_request", e))?;
        row.as_ref().map(rows::approval_request).transpose()
    }

    async fn list_pending_for_agent(&mut self, agent_id: AgentId) -> StoreResult<Vec<ApprovalRequest>> {
        let sql = format!(
            "SELECT {} FROM approval_requests \
             WHERE agent_id = $1 AND status = 'pending' ORDER BY created_at, id",
            rows::REQUEST_COLUMNS
        );
        let found = sqlx::query(&sql)
            .bind(agent_id.as_uuid())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("tx.list_pending_for_agent", e))?;
        rows::all(&found, rows::approval_request)
    }

    async fn list_requests_for_distributor(
        &mut self,
        distributor_id: DistributorId,
    ) -> StoreResult<Vec<ApprovalRequest>> {
        let sql = format!(
            "SELECT {} FROM approval_requests WHERE distributor_id = $1 ORDER BY created_at, id",
            rows::REQUEST_COLUMNS
        );
        let found = sqlx::query(&sql)
            .bind(distributor_id.as_uuid())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("tx.list_requests_for_distributor", e))?;
        rows::all(&found, rows::approval_request)
    }

    async fn insert_request(&mut self, request: &ApprovalRequest) -> StoreResult<()> {
        let sql = format!(
            "INSERT INTO approval_requests ({}) VALUES ($1, $2, $3, $4, $5, $6)",
            rows::REQUEST_COLUMNS
        );
        sqlx::query(&sql)
            .bind(request.id.as_uuid())
            .bind(request.agent_id.as_uuid())
            .bind(request.distributor_id.as_uuid())
            .bind(request.status.as_str())
            .bind(request.created_at)
            .bind(request.decided_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("tx.insert_request", e))?;
        Ok(())
    }

    async fn update_request(&mut self, request: &ApprovalRequest) -> StoreResult<()> {
        sqlx::query("UPDATE approval_requests SET status = $2, decided_at = $3 WHERE id = $1")
            .bind(request.id.as_uuid())
            .bind(request.status.as_str())
            .bind(request.decided_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("tx.update_request", e))?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("tx.commit", e))
    }
}
