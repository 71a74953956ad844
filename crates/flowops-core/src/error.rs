use thiserror::Error;

/// Core error type for FlowOps operations.
#[derive(Error, Debug)]
pub enum FlowOpsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A store lookup miss.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Workflow with ID {0} not found")]
    WorkflowNotFound(String),

    /// The store was unreachable or did not acknowledge a write.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The queue could not be reached or refused the message.
    #[error("Publish error: {0}")]
    Publish(String),

    /// The workflow was stored but its creation event was not published.
    #[error("Workflow {workflow_id} was stored but its creation event was not published: {message}")]
    Notification {
        workflow_id: String,
        message: String,
    },

    #[error("Workflow service unavailable: {0}")]
    DownstreamUnavailable(String),

    /// The workflow service answered with an error status.
    #[error("Workflow service responded with status {status}")]
    Downstream {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlowOpsError {
    /// Stable machine-readable tag for this error kind.
    pub fn error_type(&self) -> &'static str {
        match self {
            FlowOpsError::Validation(_) => "VALIDATION_ERROR",
            FlowOpsError::NotFound(_) | FlowOpsError::WorkflowNotFound(_) => "NOT_FOUND",
            FlowOpsError::Persistence(_) => "PERSISTENCE_ERROR",
            FlowOpsError::Publish(_) => "PUBLISH_ERROR",
            FlowOpsError::Notification { .. } => "NOTIFICATION_ERROR",
            FlowOpsError::DownstreamUnavailable(_) => "DOWNSTREAM_UNAVAILABLE",
            FlowOpsError::Downstream { .. } => "DOWNSTREAM_ERROR",
            FlowOpsError::Config(_)
            | FlowOpsError::Serialization(_)
            | FlowOpsError::Io(_)
            | FlowOpsError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<serde_json::Error> for FlowOpsError {
    fn from(e: serde_json::Error) -> Self {
        FlowOpsError::Serialization(e.to_string())
    }
}

/// Result type alias using FlowOpsError.
pub type Result<T> = std::result::Result<T, FlowOpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        assert_eq!(
            FlowOpsError::Validation("x".into()).error_type(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            FlowOpsError::WorkflowNotFound("abc".into()).error_type(),
            "NOT_FOUND"
        );
        assert_eq!(
            FlowOpsError::Internal("boom".into()).error_type(),
            "INTERNAL_SERVER_ERROR"
        );
    }

    #[test]
    fn test_notification_message_names_workflow() {
        let err = FlowOpsError::Notification {
            workflow_id: "wf-1".into(),
            message: "broker down".into(),
        };
        let text = err.to_string();
        assert!(text.contains("wf-1"));
        assert!(text.contains("broker down"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: FlowOpsError = parse_err.into();
        assert!(matches!(err, FlowOpsError::Serialization(_)));
    }
}
