use futures::future::BoxFuture;

use super::event::WorkflowCreatedEvent;
use super::model::Workflow;
use crate::error::Result;

/// Durable keyed storage for workflow records.
///
/// Implementations live in the runtime crate so the orchestrator can be
/// constructed against any backend, including test doubles.
pub trait WorkflowStore: Send + Sync {
    /// Insert a full record.
    ///
    /// Fails with `Persistence` when the backend is unreachable or the write
    /// is not acknowledged.
    fn put<'a>(&'a self, workflow: &'a Workflow) -> BoxFuture<'a, Result<()>>;

    /// Fetch a record by ID. Fails with `NotFound` on a miss.
    fn get<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Workflow>>;

    /// All records, newest first.
    fn list(&self) -> BoxFuture<'_, Result<Vec<Workflow>>>;

    /// Check that the backend is reachable.
    fn health_check(&self) -> BoxFuture<'_, Result<()>>;
}

/// Publishes workflow creation notifications.
pub trait EventPublisher: Send + Sync {
    /// Deliver the event. Either fully succeeds or fails with `Publish`.
    fn publish<'a>(&'a self, event: &'a WorkflowCreatedEvent) -> BoxFuture<'a, Result<()>>;
}
