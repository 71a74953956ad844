use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::{FlowOpsError, Result};
use crate::workflow::{Workflow, WorkflowStore};

/// Store whose backend is never reachable.
#[derive(Debug, Default)]
pub struct UnavailableStore {
    attempts: AtomicUsize,
}

impl UnavailableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of operations attempted against the store.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(FlowOpsError::Persistence("store unreachable".into()))
    }
}

impl WorkflowStore for UnavailableStore {
    fn put<'a>(&'a self, _workflow: &'a Workflow) -> BoxFuture<'a, Result<()>> {
        async move { self.fail() }.boxed()
    }

    fn get<'a>(&'a self, _id: &'a str) -> BoxFuture<'a, Result<Workflow>> {
        async move { self.fail() }.boxed()
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<Workflow>>> {
        async move { self.fail() }.boxed()
    }

    fn health_check(&self) -> BoxFuture<'_, Result<()>> {
        async move { self.fail() }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::NewWorkflow;

    #[tokio::test]
    async fn test_every_operation_fails() {
        let store = UnavailableStore::new();
        let wf = Workflow::create(NewWorkflow::new("wf", "x"));

        assert!(matches!(store.put(&wf).await, Err(FlowOpsError::Persistence(_))));
        assert!(store.get(&wf.id).await.is_err());
        assert!(store.list().await.is_err());
        assert!(store.health_check().await.is_err());
        assert_eq!(store.attempts(), 4);
    }
}
