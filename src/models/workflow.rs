use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const EXECUTION_STATUS_QUEUED: &str = "queued";

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: Uuid,
    pub customer_id: String,
    pub name: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// One queued run of a workflow. Ownership passes to the executor once inserted.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecution {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub customer_id: String,
    pub payload: serde_json::Value,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub queued_at: OffsetDateTime,
}

#[cfg(test)]
impl Workflow {
    pub fn fixture(customer_id: &str, name: &str, is_active: bool) -> Self {
        let now = OffsetDateTime::now_utc();
        Workflow {
            id: Uuid::new_v4(),
            customer_id: customer_id.to_string(),
            name: name.to_string(),
            is_active,
            created_at: now,
            updated_at: now,
        }
    }
}
