use std::collections::HashMap;
use std::sync::RwLock;

use futures::future::BoxFuture;
use futures::FutureExt;

use flowops_core::error::{FlowOpsError, Result};
use flowops_core::workflow::{Workflow, WorkflowStore};

/// Process-local workflow store.
///
/// Used for local development and tests. Records do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryWorkflowStore {
    records: RwLock<HashMap<String, Workflow>>,
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Workflow>>> {
        self.records
            .read()
            .map_err(|_| FlowOpsError::Persistence("memory store lock poisoned".into()))
    }

    fn insert(&self, workflow: &Workflow) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| FlowOpsError::Persistence("memory store lock poisoned".into()))?;
        if records.contains_key(&workflow.id) {
            return Err(FlowOpsError::Persistence(format!(
                "workflow {} already exists",
                workflow.id
            )));
        }
        records.insert(workflow.id.clone(), workflow.clone());
        Ok(())
    }
}

impl WorkflowStore for MemoryWorkflowStore {
    fn put<'a>(&'a self, workflow: &'a Workflow) -> BoxFuture<'a, Result<()>> {
        async move { self.insert(workflow) }.boxed()
    }

    fn get<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Workflow>> {
        async move {
            self.read()?
                .get(id)
                .cloned()
                .ok_or_else(|| FlowOpsError::NotFound(format!("workflow {}", id)))
        }
        .boxed()
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<Workflow>>> {
        async move {
            let mut workflows: Vec<Workflow> = self.read()?.values().cloned().collect();
            workflows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(workflows)
        }
        .boxed()
    }

    fn health_check(&self) -> BoxFuture<'_, Result<()>> {
        async move { self.read().map(|_| ()) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use flowops_core::workflow::NewWorkflow;

    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryWorkflowStore::new();
        let wf = Workflow::create(NewWorkflow::new("wf", "echo hi"));

        store.put(&wf).await.unwrap();
        let fetched = store.get(&wf.id).await.unwrap();

        assert_eq!(fetched, wf);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryWorkflowStore::new();
        let err = store.get("nope").await.unwrap_err();
        assert!(matches!(err, FlowOpsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let store = MemoryWorkflowStore::new();
        let wf = Workflow::create(NewWorkflow::new("wf", "x"));

        store.put(&wf).await.unwrap();
        let err = store.put(&wf).await.unwrap_err();

        assert!(matches!(err, FlowOpsError::Persistence(_)));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryWorkflowStore::new();
        let older = Workflow::create(NewWorkflow::new("older", "x"));
        let mut newer = Workflow::create(NewWorkflow::new("newer", "y"));
        newer.created_at = older.created_at + Duration::seconds(5);
        newer.updated_at = newer.created_at;

        store.put(&older).await.unwrap();
        store.put(&newer).await.unwrap();

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();
        assert_eq!(names, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_poisoned_lock_is_persistence_error() {
        let store = MemoryWorkflowStore::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.records.write().unwrap();
            panic!("writer died holding the lock");
        }));

        assert!(matches!(store.len(), Err(FlowOpsError::Persistence(_))));
        assert!(matches!(store.is_empty(), Err(FlowOpsError::Persistence(_))));
        assert!(matches!(
            store.get("any").await,
            Err(FlowOpsError::Persistence(_))
        ));
    }
}
