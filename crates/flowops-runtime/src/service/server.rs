use std::future::Future;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use flowops_core::config::{CorsConfig, ServiceConfig};
use flowops_core::error::FlowOpsError;
use flowops_core::workflow::{NewWorkflow, Workflow};

use super::orchestrator::WorkflowOrchestrator;
use crate::http::{cors_layer, trace_id_middleware, ApiError, TraceContext};

/// Health report of the workflow service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub version: String,
    pub store: String,
}

/// HTTP boundary of the workflow orchestrator.
pub struct WorkflowServiceServer {
    config: ServiceConfig,
    cors: CorsConfig,
    orchestrator: WorkflowOrchestrator,
}

impl WorkflowServiceServer {
    /// Create a new workflow service server.
    pub fn new(config: ServiceConfig, cors: CorsConfig, orchestrator: WorkflowOrchestrator) -> Self {
        Self {
            config,
            cors,
            orchestrator,
        }
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/workflows", get(list_handler).post(create_handler))
            .route("/workflows/{id}", get(get_handler))
            .with_state(self.orchestrator.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors_layer(&self.cors))
                    .layer(middleware::from_fn(trace_id_middleware)),
            )
    }

    /// Address to bind to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr()).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Workflow service listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}

async fn create_handler(
    State(orchestrator): State<WorkflowOrchestrator>,
    Extension(trace): Extension<TraceContext>,
    payload: Result<Json<NewWorkflow>, JsonRejection>,
) -> Result<(StatusCode, Json<Workflow>), ApiError> {
    let Json(request) = payload?;

    tracing::debug!(trace_id = %trace.trace_id, name = %request.name, "Create workflow request");

    // Runs detached so a dropped client connection cannot abort a half-done create.
    let workflow = tokio::spawn(async move { orchestrator.create_workflow(request).await })
        .await
        .map_err(|e| FlowOpsError::Internal(format!("create task failed: {}", e)))??;

    Ok((StatusCode::CREATED, Json(workflow)))
}

async fn get_handler(
    State(orchestrator): State<WorkflowOrchestrator>,
    Path(id): Path<String>,
) -> Result<Json<Workflow>, ApiError> {
    Ok(Json(orchestrator.get_workflow(&id).await?))
}

async fn list_handler(
    State(orchestrator): State<WorkflowOrchestrator>,
) -> Result<Json<Vec<Workflow>>, ApiError> {
    Ok(Json(orchestrator.list_workflows().await?))
}

async fn health_handler(State(orchestrator): State<WorkflowOrchestrator>) -> impl IntoResponse {
    let (status, store) = match orchestrator.health().await {
        Ok(()) => (StatusCode::OK, "up"),
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "down")
        }
    };

    let health = ServiceHealth {
        status: if status.is_success() { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store.to_string(),
    };

    (status, Json(health))
}
