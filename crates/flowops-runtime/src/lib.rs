pub mod db;
pub mod gateway;
pub mod http;
pub mod publisher;
pub mod service;
pub mod store;

pub use db::Database;
pub use gateway::{GatewayHealth, GatewayServer, WorkflowServiceClient};
pub use http::{ApiError, ErrorResponse};
pub use publisher::{NatsConnector, QueuePublisher, RetryPolicy};
pub use service::{ServiceHealth, WorkflowOrchestrator, WorkflowServiceServer};
pub use store::{MemoryWorkflowStore, PgWorkflowStore};
