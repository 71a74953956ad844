use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{middleware, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use flowops_core::config::{CorsConfig, GatewayConfig};
use flowops_core::error::FlowOpsError;
use flowops_core::workflow::{NewWorkflow, Workflow};

use super::client::WorkflowServiceClient;
use crate::http::{cors_layer, trace_id_middleware, ApiError, TraceContext};

/// Gateway health, including what the workflow service reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayHealth {
    pub status: String,
    pub version: String,
    pub workflow_service: serde_json::Value,
}

/// Public entry point that forwards workflow requests to the workflow service.
pub struct GatewayServer {
    config: GatewayConfig,
    cors: CorsConfig,
    client: Arc<WorkflowServiceClient>,
}

impl GatewayServer {
    /// Create a new gateway.
    pub fn new(config: GatewayConfig, cors: CorsConfig, client: WorkflowServiceClient) -> Self {
        Self {
            config,
            cors,
            client: Arc::new(client),
        }
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/workflows", get(list_handler).post(create_handler))
            .route("/workflows/{id}", get(get_handler))
            .with_state(self.client.clone())
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
        tracing::info!(
            downstream = %self.client.base_url(),
            "Gateway listening on {}",
            listener.local_addr()?
        );
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}

async fn create_handler(
    State(client): State<Arc<WorkflowServiceClient>>,
    Extension(trace): Extension<TraceContext>,
    payload: Result<Json<NewWorkflow>, JsonRejection>,
) -> Result<(StatusCode, Json<Workflow>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let workflow = client
        .create_workflow(&request, Some(&trace.trace_id))
        .await?;

    tracing::info!(trace_id = %trace.trace_id, workflow_id = %workflow.id, "Workflow created");
    Ok((StatusCode::CREATED, Json(workflow)))
}

async fn get_handler(
    State(client): State<Arc<WorkflowServiceClient>>,
    Extension(trace): Extension<TraceContext>,
    Path(id): Path<String>,
) -> Result<Json<Workflow>, ApiError> {
    Ok(Json(client.get_workflow(&id, Some(&trace.trace_id)).await?))
}

async fn list_handler(
    State(client): State<Arc<WorkflowServiceClient>>,
    Extension(trace): Extension<TraceContext>,
) -> Result<Json<Vec<Workflow>>, ApiError> {
    Ok(Json(client.list_workflows(Some(&trace.trace_id)).await?))
}

async fn health_handler(State(client): State<Arc<WorkflowServiceClient>>) -> Json<GatewayHealth> {
    let workflow_service = match client.health().await {
        Ok(report) => report,
        Err(FlowOpsError::Downstream { body, .. }) => body,
        Err(e) => serde_json::json!({ "status": "unreachable", "error": e.to_string() }),
    };

    Json(GatewayHealth {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        workflow_service,
    })
}
