use std::time::Duration;

use async_nats::jetstream::{self, stream::StorageType};
use async_nats::{ConnectOptions, HeaderMap};
use futures::future::BoxFuture;
use futures::FutureExt;

use flowops_core::config::QueueConfig;
use flowops_core::error::{FlowOpsError, Result};

use super::queue::{QueueConnection, QueueConnector};

/// Header used by JetStream to deduplicate redelivered messages.
const MESSAGE_ID_HEADER: &str = "Nats-Msg-Id";

/// Connects to NATS JetStream.
///
/// A queue maps to a subject of the same name, captured by a file-backed
/// stream so messages survive a broker restart.
#[derive(Debug, Clone)]
pub struct NatsConnector {
    url: String,
    connect_timeout: Duration,
}

impl NatsConnector {
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
        }
    }

    pub fn from_config(config: &QueueConfig) -> Self {
        Self::new(config.url.clone(), config.connect_timeout())
    }

    async fn open(&self) -> Result<Box<dyn QueueConnection>> {
        let options = ConnectOptions::new()
            .name("flowops-workflow-service")
            .connection_timeout(self.connect_timeout);

        let client = async_nats::connect_with_options(&self.url, options)
            .await
            .map_err(|e| {
                FlowOpsError::Publish(format!("failed to connect to {}: {}", self.url, e))
            })?;

        tracing::debug!(url = %self.url, "Connected to NATS");
        let jetstream = jetstream::new(client.clone());
        Ok(Box::new(NatsConnection { client, jetstream }))
    }
}

impl QueueConnector for NatsConnector {
    fn connect(&self) -> BoxFuture<'_, Result<Box<dyn QueueConnection>>> {
        self.open().boxed()
    }
}

/// A single NATS connection with its JetStream context.
pub struct NatsConnection {
    client: async_nats::Client,
    jetstream: jetstream::Context,
}

impl NatsConnection {
    async fn ensure_stream(&self, queue: &str) -> Result<()> {
        self.jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: stream_name(queue),
                subjects: vec![queue.to_string()],
                storage: StorageType::File,
                ..Default::default()
            })
            .await
            .map_err(|e| FlowOpsError::Publish(format!("failed to declare queue {}: {}", queue, e)))?;
        Ok(())
    }

    async fn send(&self, queue: &str, message_id: &str, payload: Vec<u8>) -> Result<()> {
        self.ensure_stream(queue).await?;

        let mut headers = HeaderMap::new();
        headers.insert(MESSAGE_ID_HEADER, message_id);

        let ack = self
            .jetstream
            .publish_with_headers(queue.to_string(), headers, payload.into())
            .await
            .map_err(|e| FlowOpsError::Publish(format!("failed to send to {}: {}", queue, e)))?;

        let ack = ack.await.map_err(|e| {
            FlowOpsError::Publish(format!("broker did not acknowledge message: {}", e))
        })?;

        tracing::debug!(stream = %ack.stream, sequence = ack.sequence, "Message persisted");
        Ok(())
    }
}

impl QueueConnection for NatsConnection {
    fn send_persistent<'a>(
        &'a mut self,
        queue: &'a str,
        message_id: &'a str,
        payload: Vec<u8>,
    ) -> BoxFuture<'a, Result<()>> {
        self.send(queue, message_id, payload).boxed()
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
        async move {
            if let Err(e) = self.client.flush().await {
                tracing::warn!(error = %e, "Failed to flush NATS connection on close");
            }
        }
        .boxed()
    }
}

/// JetStream stream names may not contain subject tokens or whitespace.
fn stream_name(queue: &str) -> String {
    queue
        .chars()
        .map(|c| match c {
            '.' | '*' | '>' | '/' | '\\' => '_',
            c if c.is_whitespace() => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_name() {
        assert_eq!(stream_name("workflows"), "WORKFLOWS");
        assert_eq!(stream_name("flowops.workflow.created"), "FLOWOPS_WORKFLOW_CREATED");
        assert_eq!(stream_name("a b>c"), "A_B_C");
    }

    #[test]
    fn test_connector_from_config() {
        let connector = NatsConnector::from_config(&QueueConfig::default());
        assert_eq!(connector.url, "nats://localhost:4222");
        assert_eq!(connector.connect_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let connector = NatsConnector::new("nats://127.0.0.1:1", Duration::from_secs(1));
        let result = connector.connect().await;
        assert!(matches!(result, Err(FlowOpsError::Publish(_))));
    }
}
