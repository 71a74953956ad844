mod nats;
mod queue;

pub use nats::{NatsConnection, NatsConnector};
pub use queue::{QueueConnection, QueueConnector, QueuePublisher, RetryPolicy};
