//! Gateway and workflow service talking over real sockets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use flowops_core::config::{CorsConfig, GatewayConfig, ServiceConfig};
use flowops_core::testing::RecordingPublisher;
use flowops_core::Workflow;
use flowops_runtime::{
    ErrorResponse, GatewayHealth, GatewayServer, MemoryWorkflowStore, WorkflowOrchestrator,
    WorkflowServiceClient, WorkflowServiceServer,
};
use reqwest::StatusCode;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct Running {
    addr: SocketAddr,
    _stop: oneshot::Sender<()>,
}

async fn start_service(publisher: Arc<RecordingPublisher>) -> Running {
    let orchestrator = WorkflowOrchestrator::new(Arc::new(MemoryWorkflowStore::new()), publisher);
    let server =
        WorkflowServiceServer::new(ServiceConfig::default(), CorsConfig::default(), orchestrator);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(server.serve(listener, async move {
        let _ = stopped.await;
    }));

    Running { addr, _stop: stop }
}

async fn start_gateway(downstream: &str) -> Running {
    let client = WorkflowServiceClient::new(downstream, Duration::from_secs(5)).unwrap();
    let gateway = GatewayServer::new(GatewayConfig::default(), CorsConfig::default(), client);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(gateway.serve(listener, async move {
        let _ = stopped.await;
    }));

    Running { addr, _stop: stop }
}

async fn stack(publisher: Arc<RecordingPublisher>) -> (Running, Running) {
    let service = start_service(publisher).await;
    let gateway = start_gateway(&format!("http://{}", service.addr)).await;
    (service, gateway)
}

#[tokio::test]
async fn test_create_through_gateway() {
    let publisher = Arc::new(RecordingPublisher::new());
    let (_service, gateway) = stack(publisher.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/workflows", gateway.addr))
        .header("x-trace-id", "it-trace")
        .json(&serde_json::json!({ "name": "Sample Workflow", "script": "print('hi')" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()["x-trace-id"], "it-trace");

    let workflow: Workflow = response.json().await.unwrap();
    assert_eq!(workflow.name, "Sample Workflow");
    assert_eq!(workflow.script, "print('hi')");
    assert_eq!(workflow.created_at, workflow.updated_at);

    assert_eq!(publisher.call_count(), 1);
    publisher.assert_published_for(&workflow.id);

    let fetched: Workflow = reqwest::get(format!("http://{}/workflows/{}", gateway.addr, workflow.id))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, workflow);
}

#[tokio::test]
async fn test_unknown_id_relays_404() {
    let (_service, gateway) = stack(Arc::new(RecordingPublisher::new())).await;

    let response = reqwest::get(format!("http://{}/workflows/does-not-exist", gateway.addr))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.status_code, 404);
    assert_eq!(error.error_type, "NOT_FOUND");
    assert_eq!(error.message, "Workflow with ID does-not-exist not found");
}

#[tokio::test]
async fn test_publish_failure_relays_500() {
    let publisher = Arc::new(RecordingPublisher::failing("broker unreachable"));
    let (_service, gateway) = stack(publisher.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/workflows", gateway.addr))
        .json(&serde_json::json!({ "name": "wf", "script": "x" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.error_type, "NOTIFICATION_ERROR");
    let workflow_id = error.details.unwrap()["workflow_id"]
        .as_str()
        .unwrap()
        .to_string();

    // The record survives the failed notification.
    let response = reqwest::get(format!("http://{}/workflows/{}", gateway.addr, workflow_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_validation_error_returns_400() {
    let publisher = Arc::new(RecordingPublisher::new());
    let (_service, gateway) = stack(publisher.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/workflows", gateway.addr))
        .json(&serde_json::json!({ "name": "", "script": "x" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    publisher.assert_not_called();
}

#[tokio::test]
async fn test_downstream_down_returns_502() {
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_addr = closed.local_addr().unwrap();
    drop(closed);

    let gateway = start_gateway(&format!("http://{}", closed_addr)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/workflows", gateway.addr))
        .json(&serde_json::json!({ "name": "wf", "script": "x" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.error_type, "DOWNSTREAM_UNAVAILABLE");
}

#[tokio::test]
async fn test_gateway_health_includes_service() {
    let (_service, gateway) = stack(Arc::new(RecordingPublisher::new())).await;

    let health: GatewayHealth = reqwest::get(format!("http://{}/health", gateway.addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.workflow_service["status"], "healthy");
    assert_eq!(health.workflow_service["store"], "up");
}
