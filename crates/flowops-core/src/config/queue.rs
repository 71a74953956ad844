use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Event queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Broker URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Durable queue that receives workflow events.
    #[serde(default = "default_queue_name")]
    pub queue_name: String,

    /// Connection attempts per publish before giving up.
    #[serde(default = "default_max_connect_attempts")]
    pub max_connect_attempts: u32,

    /// Delay between connection attempts in seconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Timeout for a single connection attempt in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl QueueConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Longest a publish can spend connecting before it gives up: every
    /// attempt timing out, plus the pauses between them.
    pub fn connect_window(&self) -> Duration {
        let attempts = self.max_connect_attempts.max(1);
        self.connect_timeout() * attempts + self.retry_delay() * (attempts - 1)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            queue_name: default_queue_name(),
            max_connect_attempts: default_max_connect_attempts(),
            retry_delay_secs: default_retry_delay(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_queue_name() -> String {
    "workflows".to_string()
}

fn default_max_connect_attempts() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    3
}

fn default_connect_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_queue_config() {
        let config = QueueConfig::default();
        assert_eq!(config.queue_name, "workflows");
        assert_eq!(config.max_connect_attempts, 5);
        assert_eq!(config.retry_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_connect_window() {
        assert_eq!(QueueConfig::default().connect_window(), Duration::from_secs(37));

        let single = QueueConfig {
            max_connect_attempts: 0,
            ..Default::default()
        };
        assert_eq!(single.connect_window(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_queue_config() {
        let toml = r#"
            url = "nats://broker:4222"
            queue_name = "workflow-events"
            retry_delay_secs = 1
        "#;

        let config: QueueConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.url, "nats://broker:4222");
        assert_eq!(config.queue_name, "workflow-events");
        assert_eq!(config.retry_delay_secs, 1);
        assert_eq!(config.max_connect_attempts, 5);
    }
}
