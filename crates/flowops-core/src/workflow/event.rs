use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Workflow;

/// Event type tag for workflow creation notifications.
pub const WORKFLOW_CREATED_EVENT: &str = "workflow.created";

/// Notification published after a workflow has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowCreatedEvent {
    /// Unique per publish attempt.
    pub event_id: String,
    /// Always [`WORKFLOW_CREATED_EVENT`].
    pub event_type: String,
    pub workflow_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl WorkflowCreatedEvent {
    /// Build the event for a persisted workflow.
    pub fn for_workflow(workflow: &Workflow) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            event_type: WORKFLOW_CREATED_EVENT.to_string(),
            workflow_id: workflow.id.clone(),
            name: workflow.name.clone(),
            created_at: workflow.created_at,
        }
    }
}
