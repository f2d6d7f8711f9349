use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::db::{
    form_schema_repository::FormSchemaRepository,
    workflow_repository::{ExecutionQueue, WorkflowRepository},
};
use crate::models::{form_schema::FormSchema, workflow::Workflow};

/// In-memory workflow store. Mirrors the `customer_id = $1 AND is_active` query.
#[derive(Default)]
pub struct MockWorkflowRepository {
    pub workflows: Vec<Workflow>,
    pub should_fail: bool,
    pub queries: Mutex<Vec<String>>,
}

impl MockWorkflowRepository {
    pub fn with_workflows(workflows: Vec<Workflow>) -> Self {
        Self {
            workflows,
            ..Default::default()
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl WorkflowRepository for MockWorkflowRepository {
    async fn list_active_workflows(&self, customer_id: &str) -> Result<Vec<Workflow>, sqlx::Error> {
        self.queries.lock().unwrap().push(customer_id.to_string());
        if self.should_fail {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        Ok(self
            .workflows
            .iter()
            .filter(|wf| wf.customer_id == customer_id && wf.is_active)
            .cloned()
            .collect())
    }
}

/// Hands out `exec_1`, `exec_2`, ... in call order and records every call.
#[derive(Default)]
pub struct RecordingExecutionQueue {
    pub calls: Mutex<Vec<(Uuid, String, Value)>>,
    pub fail_for: Vec<Uuid>,
}

#[async_trait]
impl ExecutionQueue for RecordingExecutionQueue {
    async fn enqueue(
        &self,
        workflow_id: Uuid,
        customer_id: &str,
        payload: Value,
    ) -> Result<String, sqlx::Error> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((workflow_id, customer_id.to_string(), payload));
        if self.fail_for.contains(&workflow_id) {
            return Err(sqlx::Error::Protocol("Mock queue failure".into()));
        }
        Ok(format!("exec_{}", calls.len()))
    }
}

#[derive(Default)]
pub struct MockFormSchemaRepository {
    pub schemas: Mutex<HashMap<(String, String), FormSchema>>,
    pub should_fail: bool,
}

#[async_trait]
impl FormSchemaRepository for MockFormSchemaRepository {
    async fn find_schema(
        &self,
        customer_id: &str,
        form_id: &str,
    ) -> Result<Option<FormSchema>, sqlx::Error> {
        if self.should_fail {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        Ok(self
            .schemas
            .lock()
            .unwrap()
            .get(&(customer_id.to_string(), form_id.to_string()))
            .cloned())
    }

    async fn upsert_schema(
        &self,
        customer_id: &str,
        form_id: &str,
        schema: &FormSchema,
    ) -> Result<(), sqlx::Error> {
        if self.should_fail {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        self.schemas.lock().unwrap().insert(
            (customer_id.to_string(), form_id.to_string()),
            schema.clone(),
        );
        Ok(())
    }
}
