pub mod config;
pub mod error;
pub mod workflow;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::FlowOpsConfig;
pub use error::{FlowOpsError, Result};
pub use workflow::{
    EventPublisher, NewWorkflow, Workflow, WorkflowCreatedEvent, WorkflowStore,
    WORKFLOW_CREATED_EVENT,
};
