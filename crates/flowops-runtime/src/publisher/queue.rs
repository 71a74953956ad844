use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;

use flowops_core::config::QueueConfig;
use flowops_core::error::{FlowOpsError, Result};
use flowops_core::workflow::{EventPublisher, WorkflowCreatedEvent};

/// An open connection to a message broker.
pub trait QueueConnection: Send {
    /// Send a payload to a durable queue and wait until the broker has
    /// persisted it.
    fn send_persistent<'a>(
        &'a mut self,
        queue: &'a str,
        message_id: &'a str,
        payload: Vec<u8>,
    ) -> BoxFuture<'a, Result<()>>;

    /// Tear the connection down.
    fn close(self: Box<Self>) -> BoxFuture<'static, ()>;
}

/// Opens broker connections.
pub trait QueueConnector: Send + Sync {
    fn connect(&self) -> BoxFuture<'_, Result<Box<dyn QueueConnection>>>;
}

/// Bounded connection retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total connection attempts, including the first.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &QueueConfig) -> Self {
        Self {
            max_attempts: config.max_connect_attempts.max(1),
            delay: config.retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(3),
        }
    }
}

/// Publishes workflow events to a durable queue.
///
/// Every publish opens its own connection, retrying the connect according to
/// the [`RetryPolicy`], and closes it again whether or not the send succeeded.
pub struct QueuePublisher {
    connector: Arc<dyn QueueConnector>,
    queue_name: String,
    retry: RetryPolicy,
}

impl QueuePublisher {
    /// Create a new publisher.
    pub fn new(
        connector: Arc<dyn QueueConnector>,
        queue_name: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            connector,
            queue_name: queue_name.into(),
            retry,
        }
    }

    /// Name of the target queue.
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    async fn connect_with_retry(&self) -> Result<Box<dyn QueueConnection>> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.connector.connect().await {
                Ok(connection) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "Connected to message broker after retry");
                    }
                    return Ok(connection);
                }
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = self.retry.delay.as_millis() as u64,
                        error = %e,
                        "Failed to connect to message broker, retrying"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(e) => {
                    tracing::error!(attempt, error = %e, "Giving up connecting to message broker");
                    return Err(FlowOpsError::Publish(format!(
                        "could not connect to message broker after {} attempts: {}",
                        attempt, e
                    )));
                }
            }
        }
    }

    async fn send(&self, event: &WorkflowCreatedEvent) -> Result<()> {
        let payload = serde_json::to_vec(event)
            .map_err(|e| FlowOpsError::Publish(format!("failed to encode event: {}", e)))?;

        let mut connection = self.connect_with_retry().await?;
        let result = connection
            .send_persistent(&self.queue_name, &event.event_id, payload)
            .await;
        connection.close().await;

        match &result {
            Ok(()) => tracing::info!(
                event_id = %event.event_id,
                workflow_id = %event.workflow_id,
                queue = %self.queue_name,
                "Published {} event",
                event.event_type
            ),
            Err(e) => tracing::error!(
                event_id = %event.event_id,
                workflow_id = %event.workflow_id,
                error = %e,
                "Failed to publish event"
            ),
        }

        result.map_err(|e| match e {
            FlowOpsError::Publish(_) => e,
            other => FlowOpsError::Publish(other.to_string()),
        })
    }
}

impl EventPublisher for QueuePublisher {
    fn publish<'a>(&'a self, event: &'a WorkflowCreatedEvent) -> BoxFuture<'a, Result<()>> {
        self.send(event).boxed()
    }
}
