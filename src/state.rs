use crate::config::Config;
use crate::db::{
    form_schema_repository::FormSchemaRepository,
    workflow_repository::{ExecutionQueue, WorkflowRepository},
};
use crate::services::integration_app::IntegrationAppClient;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub workflow_repo: Arc<dyn WorkflowRepository>,
    pub execution_queue: Arc<dyn ExecutionQueue>,
    pub form_schema_repo: Arc<dyn FormSchemaRepository>,
    pub http_client: Client,
    pub config: Arc<Config>,
}

impl AppState {
    /// Integration API handle acting with the caller's bearer token.
    pub fn integration_client(&self, token: Option<String>) -> IntegrationAppClient {
        IntegrationAppClient::new(
            self.http_client.clone(),
            self.config.integration.clone(),
            token,
        )
    }
}

#[cfg(test)]
pub fn test_state() -> AppState {
    use crate::db::mock_db::{
        MockFormSchemaRepository, MockWorkflowRepository, RecordingExecutionQueue,
    };

    AppState {
        workflow_repo: Arc::new(MockWorkflowRepository::default()),
        execution_queue: Arc::new(RecordingExecutionQueue::default()),
        form_schema_repo: Arc::new(MockFormSchemaRepository::default()),
        http_client: Client::new(),
        config: Arc::new(crate::config::test_config()),
    }
}
