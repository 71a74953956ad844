use std::sync::Arc;

use flowops_core::error::{FlowOpsError, Result};
use flowops_core::workflow::{
    EventPublisher, NewWorkflow, Workflow, WorkflowCreatedEvent, WorkflowStore,
};

/// Creates and reads workflows.
///
/// A create persists the record first and only then publishes the
/// `workflow.created` event. A failed publish leaves the record stored and
/// reports [`FlowOpsError::Notification`] with the new workflow's ID.
#[derive(Clone)]
pub struct WorkflowOrchestrator {
    store: Arc<dyn WorkflowStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl WorkflowOrchestrator {
    pub fn new(store: Arc<dyn WorkflowStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { store, publisher }
    }

    /// Create a workflow, persist it and announce it.
    pub async fn create_workflow(&self, request: NewWorkflow) -> Result<Workflow> {
        request.validate()?;

        let workflow = Workflow::create(request);

        self.store.put(&workflow).await.map_err(|e| {
            tracing::error!(workflow_id = %workflow.id, error = %e, "Failed to store workflow");
            match e {
                FlowOpsError::Persistence(_) => e,
                other => FlowOpsError::Persistence(other.to_string()),
            }
        })?;

        tracing::info!(workflow_id = %workflow.id, name = %workflow.name, "Workflow stored");

        let event = WorkflowCreatedEvent::for_workflow(&workflow);
        if let Err(e) = self.publisher.publish(&event).await {
            tracing::error!(
                workflow_id = %workflow.id,
                event_id = %event.event_id,
                error = %e,
                "Workflow stored but creation event was not published"
            );
            return Err(FlowOpsError::Notification {
                workflow_id: workflow.id,
                message: e.to_string(),
            });
        }

        Ok(workflow)
    }

    /// Fetch a workflow by ID.
    pub async fn get_workflow(&self, id: &str) -> Result<Workflow> {
        match self.store.get(id).await {
            Ok(workflow) => Ok(workflow),
            Err(FlowOpsError::NotFound(_)) => Err(FlowOpsError::WorkflowNotFound(id.to_string())),
            Err(e) => Err(e),
        }
    }

    /// All workflows, newest first.
    pub async fn list_workflows(&self) -> Result<Vec<Workflow>> {
        self.store.list().await
    }

    /// Check that the store is reachable.
    pub async fn health(&self) -> Result<()> {
        self.store.health_check().await
    }
}
