use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::models::workflow::Workflow;

#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Active workflows owned by `customer_id`, oldest first.
    async fn list_active_workflows(&self, customer_id: &str) -> Result<Vec<Workflow>, sqlx::Error>;
}

/// Hands a triggered workflow over to the executor and returns the execution id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionQueue: Send + Sync {
    async fn enqueue(
        &self,
        workflow_id: Uuid,
        customer_id: &str,
        payload: Value,
    ) -> Result<String, sqlx::Error>;
}
