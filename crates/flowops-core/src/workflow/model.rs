use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FlowOpsError, Result};

/// Maximum workflow name length, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Request to create a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkflow {
    /// Display name (1-255 characters).
    pub name: String,
    /// Opaque script payload. Never executed by FlowOps.
    pub script: String,
}

impl NewWorkflow {
    /// Create a new request.
    pub fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
        }
    }

    /// Check the request shape.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(FlowOpsError::Validation("name must not be empty".into()));
        }
        let name_len = self.name.chars().count();
        if name_len > MAX_NAME_LENGTH {
            return Err(FlowOpsError::Validation(format!(
                "name must be at most {} characters, got {}",
                MAX_NAME_LENGTH, name_len
            )));
        }
        if self.script.is_empty() {
            return Err(FlowOpsError::Validation("script must not be empty".into()));
        }
        // Postgres text columns cannot hold NUL.
        if self.name.contains('\0') {
            return Err(FlowOpsError::Validation("name must not contain NUL characters".into()));
        }
        if self.script.contains('\0') {
            return Err(FlowOpsError::Validation("script must not contain NUL characters".into()));
        }
        Ok(())
    }
}

/// A stored workflow record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique workflow ID, assigned at creation.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Opaque script payload.
    pub script: String,
    /// When the workflow was created.
    pub created_at: DateTime<Utc>,
    /// When the workflow was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Build a workflow from a validated request, assigning a fresh ID and
    /// timestamps.
    ///
    /// Timestamps are truncated to microseconds, the precision the Postgres
    /// store keeps, so a record read back compares equal to the one returned
    /// from creation.
    pub fn create(request: NewWorkflow) -> Self {
        let now = Utc::now().trunc_subsecs(6);
        Self {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            script: request.script,
            created_at: now,
            updated_at: now,
        }
    }
}
