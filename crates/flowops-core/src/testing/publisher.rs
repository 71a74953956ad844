use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::{FlowOpsError, Result};
use crate::workflow::{EventPublisher, WorkflowCreatedEvent};

/// Publisher that records every call.
///
/// # Example
///
/// ```ignore
/// let publisher = RecordingPublisher::new();
/// service.create_workflow(request).await?;
///
/// assert_eq!(publisher.call_count(), 1);
/// publisher.assert_published_for(&workflow.id);
/// ```
#[derive(Default)]
pub struct RecordingPublisher {
    events: RwLock<Vec<WorkflowCreatedEvent>>,
    calls: AtomicUsize,
    failure: Option<String>,
}

impl RecordingPublisher {
    /// Create a publisher that accepts every event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a publisher that rejects every event with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of publish calls, successful or not.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Events that were accepted.
    pub fn published(&self) -> Vec<WorkflowCreatedEvent> {
        self.events.read().unwrap().clone()
    }

    /// Assert that an event was accepted for the given workflow.
    pub fn assert_published_for(&self, workflow_id: &str) {
        let events = self.events.read().unwrap();
        assert!(
            events.iter().any(|e| e.workflow_id == workflow_id),
            "Expected an event for workflow '{}', got {:?}",
            workflow_id,
            events.iter().map(|e| &e.workflow_id).collect::<Vec<_>>()
        );
    }

    /// Assert that publish was never called.
    pub fn assert_not_called(&self) {
        let calls = self.call_count();
        assert_eq!(calls, 0, "Expected no publish calls, got {}", calls);
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish<'a>(&'a self, event: &'a WorkflowCreatedEvent) -> BoxFuture<'a, Result<()>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.failure {
                return Err(FlowOpsError::Publish(message.clone()));
            }
            self.events.write().unwrap().push(event.clone());
            Ok(())
        }
        .boxed()
    }
}
