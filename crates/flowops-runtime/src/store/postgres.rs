use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use sqlx::postgres::PgRow;
use sqlx::Row;

use flowops_core::error::{FlowOpsError, Result};
use flowops_core::workflow::{Workflow, WorkflowStore};

use crate::db::Database;

/// Schema for the workflow table, applied at startup.
const WORKFLOWS_SQL: &str = include_str!("../../migrations/0001_create_workflows.sql");

/// Workflow store backed by Postgres.
#[derive(Clone)]
pub struct PgWorkflowStore {
    db: Arc<Database>,
}

impl PgWorkflowStore {
    /// Create a new store over a shared database handle.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create the workflow table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        let pool = self.db.pool().await?;
        sqlx::raw_sql(WORKFLOWS_SQL)
            .execute(&pool)
            .await
            .map_err(|e| FlowOpsError::Persistence(format!("Failed to apply schema: {}", e)))?;
        tracing::debug!("Workflow schema ready");
        Ok(())
    }

    async fn insert(&self, workflow: &Workflow) -> Result<()> {
        let pool = self.db.pool().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO flowops_workflows (id, name, script, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&workflow.id)
        .bind(&workflow.name)
        .bind(&workflow.script)
        .bind(workflow.created_at)
        .bind(workflow.updated_at)
        .execute(&pool)
        .await
        .map_err(|e| FlowOpsError::Persistence(format!("Failed to insert workflow: {}", e)))?;

        if result.rows_affected() != 1 {
            return Err(FlowOpsError::Persistence(format!(
                "Insert of workflow {} was not acknowledged ({} rows affected)",
                workflow.id,
                result.rows_affected()
            )));
        }

        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Workflow> {
        let pool = self.db.pool().await?;
        let row = sqlx::query(
            r#"
            SELECT id, name, script, created_at, updated_at
            FROM flowops_workflows
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| FlowOpsError::Persistence(format!("Failed to fetch workflow: {}", e)))?;

        match row {
            Some(row) => row_to_workflow(&row),
            None => Err(FlowOpsError::NotFound(format!("workflow {}", id))),
        }
    }

    async fn fetch_all(&self) -> Result<Vec<Workflow>> {
        let pool = self.db.pool().await?;
        let rows = sqlx::query(
            r#"
            SELECT id, name, script, created_at, updated_at
            FROM flowops_workflows
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&pool)
        .await
        .map_err(|e| FlowOpsError::Persistence(format!("Failed to list workflows: {}", e)))?;

        rows.iter().map(row_to_workflow).collect()
    }
}

fn row_to_workflow(row: &PgRow) -> Result<Workflow> {
    let decode = |e: sqlx::Error| FlowOpsError::Persistence(format!("Malformed workflow row: {}", e));
    Ok(Workflow {
        id: row.try_get("id").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
        script: row.try_get("script").map_err(decode)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(decode)?,
    })
}

impl WorkflowStore for PgWorkflowStore {
    fn put<'a>(&'a self, workflow: &'a Workflow) -> BoxFuture<'a, Result<()>> {
        self.insert(workflow).boxed()
    }

    fn get<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Workflow>> {
        self.fetch(id).boxed()
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<Workflow>>> {
        self.fetch_all().boxed()
    }

    fn health_check(&self) -> BoxFuture<'_, Result<()>> {
        self.db.health_check().boxed()
    }
}
