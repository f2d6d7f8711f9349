use crate::{
    db::workflow_repository::{ExecutionQueue, WorkflowRepository},
    models::workflow::{Workflow, WorkflowExecution, EXECUTION_STATUS_QUEUED},
};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresWorkflowRepository {
    pub pool: PgPool,
}

#[async_trait]
impl WorkflowRepository for PostgresWorkflowRepository {
    async fn list_active_workflows(&self, customer_id: &str) -> Result<Vec<Workflow>, sqlx::Error> {
        let results = sqlx::query_as::<_, Workflow>(
            r#"
            SELECT id,
                   customer_id,
                   name,
                   is_active,
                   created_at,
                   updated_at
            FROM workflows
            WHERE customer_id = $1
              AND is_active = true
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }
}

pub struct PostgresExecutionQueue {
    pub pool: PgPool,
}

#[async_trait]
impl ExecutionQueue for PostgresExecutionQueue {
    async fn enqueue(
        &self,
        workflow_id: Uuid,
        customer_id: &str,
        payload: Value,
    ) -> Result<String, sqlx::Error> {
        let execution = sqlx::query_as::<_, WorkflowExecution>(
            r#"
            INSERT INTO workflow_executions (workflow_id, customer_id, payload, status, queued_at)
            VALUES ($1, $2, $3, $4, now())
            RETURNING id, workflow_id, customer_id, payload, status, queued_at
            "#,
        )
        .bind(workflow_id)
        .bind(customer_id)
        .bind(payload)
        .bind(EXECUTION_STATUS_QUEUED)
        .fetch_one(&self.pool)
        .await?;

        Ok(execution.id.to_string())
    }
}
