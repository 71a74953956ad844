mod orchestrator;
mod server;

pub use orchestrator::WorkflowOrchestrator;
pub use server::{ServiceHealth, WorkflowServiceServer};
