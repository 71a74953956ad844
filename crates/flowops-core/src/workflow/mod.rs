mod event;
mod model;
mod traits;

pub use event::{WorkflowCreatedEvent, WORKFLOW_CREATED_EVENT};
pub use model::{NewWorkflow, Workflow, MAX_NAME_LENGTH};
pub use traits::{EventPublisher, WorkflowStore};
