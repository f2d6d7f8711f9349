use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::workflow_repository::{ExecutionQueue, WorkflowRepository};

pub const NO_ACTIVE_WORKFLOWS_MESSAGE: &str = "No active workflows found for this customer";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Customer ID is required")]
    MissingCustomerId,
    #[error("Workflow lookup failed: {0}")]
    Store(#[from] sqlx::Error),
    #[error("All {0} workflow enqueue(s) failed")]
    AllEnqueuesFailed(usize),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueFailure {
    pub workflow_id: Uuid,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub matched: usize,
    pub execution_ids: Vec<String>,
    pub failures: Vec<EnqueueFailure>,
}

impl DispatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn message(&self) -> String {
        if self.matched == 0 {
            return NO_ACTIVE_WORKFLOWS_MESSAGE.to_string();
        }
        if self.failures.is_empty() {
            format!("Triggered {} workflow(s)", self.execution_ids.len())
        } else {
            format!(
                "Triggered {} of {} workflow(s)",
                self.execution_ids.len(),
                self.matched
            )
        }
    }
}

/// Enqueues one execution per active workflow of `customer_id`.
///
/// Enqueues run one after another in store order. A failed enqueue is recorded
/// against its workflow and the remaining workflows are still triggered; only
/// when every enqueue fails does the dispatch itself fail.
pub async fn dispatch(
    workflows: &dyn WorkflowRepository,
    queue: &dyn ExecutionQueue,
    customer_id: &str,
    payload: Value,
) -> Result<DispatchOutcome, DispatchError> {
    if customer_id.trim().is_empty() {
        return Err(DispatchError::MissingCustomerId);
    }

    let matched = workflows.list_active_workflows(customer_id).await?;
    if matched.is_empty() {
        info!(%customer_id, "no active workflows for webhook");
        return Ok(DispatchOutcome::default());
    }

    let mut outcome = DispatchOutcome {
        matched: matched.len(),
        ..Default::default()
    };
    for workflow in &matched {
        match queue
            .enqueue(workflow.id, customer_id, payload.clone())
            .await
        {
            Ok(execution_id) => outcome.execution_ids.push(execution_id),
            Err(err) => {
                warn!(
                    %customer_id,
                    workflow_id = %workflow.id,
                    error = ?err,
                    "failed to enqueue workflow execution"
                );
                outcome.failures.push(EnqueueFailure {
                    workflow_id: workflow.id,
                    error: err.to_string(),
                });
            }
        }
    }

    if outcome.execution_ids.is_empty() {
        return Err(DispatchError::AllEnqueuesFailed(outcome.failures.len()));
    }

    info!(
        %customer_id,
        triggered = outcome.execution_ids.len(),
        failed = outcome.failures.len(),
        "dispatched webhook to workflows"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mock_db::{MockWorkflowRepository, RecordingExecutionQueue};
    use crate::db::workflow_repository::MockExecutionQueue;
    use crate::models::workflow::Workflow;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use serde_json::json;

    #[tokio::test]
    async fn empty_customer_id_is_rejected_before_lookup() {
        let repo = MockWorkflowRepository::default();
        let queue = RecordingExecutionQueue::default();

        let result = dispatch(&repo, &queue, "   ", json!({})).await;

        assert!(matches!(result, Err(DispatchError::MissingCustomerId)));
        assert_eq!(repo.query_count(), 0);
    }

    #[tokio::test]
    async fn customer_id_reaches_the_store_unchanged() {
        let repo = MockWorkflowRepository::default();
        let queue = RecordingExecutionQueue::default();

        dispatch(&repo, &queue, " cust_1", json!({})).await.unwrap();

        assert_eq!(*repo.queries.lock().unwrap(), vec![" cust_1".to_string()]);
    }

    #[tokio::test]
    async fn no_active_workflows_is_not_an_error() {
        let repo = MockWorkflowRepository::with_workflows(vec![Workflow::fixture(
            "cust_1", "inactive", false,
        )]);
        let queue = RecordingExecutionQueue::default();

        let outcome = dispatch(&repo, &queue, "cust_1", json!({"a": 1}))
            .await
            .unwrap();

        assert!(outcome.execution_ids.is_empty());
        assert!(outcome.is_complete());
        assert_eq!(outcome.message(), NO_ACTIVE_WORKFLOWS_MESSAGE);
        assert!(queue.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn enqueues_each_active_workflow_in_store_order() {
        let wf_a = Workflow::fixture("cust_1", "wf_a", true);
        let wf_b = Workflow::fixture("cust_1", "wf_b", true);
        let other = Workflow::fixture("cust_2", "other", true);
        let repo =
            MockWorkflowRepository::with_workflows(vec![wf_a.clone(), other, wf_b.clone()]);
        let queue = RecordingExecutionQueue::default();
        let payload = json!({"event": "contact.created"});

        let outcome = dispatch(&repo, &queue, "cust_1", payload.clone())
            .await
            .unwrap();

        assert_eq!(outcome.execution_ids, vec!["exec_1", "exec_2"]);
        assert_eq!(outcome.message(), "Triggered 2 workflow(s)");
        let calls = queue.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], (wf_a.id, "cust_1".to_string(), payload.clone()));
        assert_eq!(calls[1], (wf_b.id, "cust_1".to_string(), payload));
    }

    #[tokio::test]
    async fn enqueue_is_called_exactly_once_per_workflow() {
        let workflows: Vec<Workflow> = (0..3)
            .map(|i| Workflow::fixture("cust_9", &format!("wf_{i}"), true))
            .collect();
        let repo = MockWorkflowRepository::with_workflows(workflows.clone());

        let mut queue = MockExecutionQueue::new();
        let mut seq = Sequence::new();
        for (i, wf) in workflows.iter().enumerate() {
            let id = format!("run-{i}");
            queue
                .expect_enqueue()
                .with(eq(wf.id), eq("cust_9"), eq(json!({"n": 1})))
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, _, _| Ok(id.clone()));
        }

        let outcome = dispatch(&repo, &queue, "cust_9", json!({"n": 1}))
            .await
            .unwrap();

        assert_eq!(outcome.execution_ids, vec!["run-0", "run-1", "run-2"]);
    }

    #[tokio::test]
    async fn partial_enqueue_failure_is_reported_per_workflow() {
        let wf_a = Workflow::fixture("cust_1", "wf_a", true);
        let wf_b = Workflow::fixture("cust_1", "wf_b", true);
        let repo = MockWorkflowRepository::with_workflows(vec![wf_a.clone(), wf_b.clone()]);
        let queue = RecordingExecutionQueue {
            fail_for: vec![wf_a.id],
            ..Default::default()
        };

        let outcome = dispatch(&repo, &queue, "cust_1", json!({}))
            .await
            .unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.execution_ids, vec!["exec_2"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].workflow_id, wf_a.id);
        assert_eq!(outcome.message(), "Triggered 1 of 2 workflow(s)");
    }

    #[tokio::test]
    async fn every_enqueue_failing_fails_the_dispatch() {
        let wf_a = Workflow::fixture("cust_1", "wf_a", true);
        let repo = MockWorkflowRepository::with_workflows(vec![wf_a.clone()]);
        let queue = RecordingExecutionQueue {
            fail_for: vec![wf_a.id],
            ..Default::default()
        };

        let result = dispatch(&repo, &queue, "cust_1", json!({})).await;

        assert!(matches!(result, Err(DispatchError::AllEnqueuesFailed(1))));
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let repo = MockWorkflowRepository {
            should_fail: true,
            ..Default::default()
        };
        let queue = RecordingExecutionQueue::default();

        let result = dispatch(&repo, &queue, "cust_1", json!({})).await;

        assert!(matches!(result, Err(DispatchError::Store(_))));
    }
}
