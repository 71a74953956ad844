mod observability;
mod queue;
mod store;

pub use observability::{LoggingConfig, ObservabilityConfig};
pub use queue::QueueConfig;
pub use store::{StoreBackend, StoreConfig};

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FlowOpsError, Result};

/// Root configuration shared by the workflow service and the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FlowOpsConfig {
    /// Workflow service listener.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Gateway listener and downstream settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Workflow store.
    #[serde(default)]
    pub store: StoreConfig,

    /// Event queue.
    #[serde(default)]
    pub queue: QueueConfig,

    /// CORS allow-lists.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl FlowOpsConfig {
    /// Whether the gateway waits longer than a create can take while the
    /// publisher is still retrying its broker connection.
    pub fn gateway_outlasts_publisher(&self) -> bool {
        self.gateway.request_timeout() > self.queue.connect_window()
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| FlowOpsError::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content)?;

        toml::from_str(&content)
            .map_err(|e| FlowOpsError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load the file if it exists, fall back to defaults otherwise, then
    /// apply `FLOWOPS_*` environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FLOWOPS_SERVICE_HOST") {
            self.service.host = v;
        }
        if let Some(v) = lookup("FLOWOPS_SERVICE_PORT") {
            self.service.port = parse_var("FLOWOPS_SERVICE_PORT", &v)?;
        }
        if let Some(v) = lookup("FLOWOPS_GATEWAY_HOST") {
            self.gateway.host = v;
        }
        if let Some(v) = lookup("FLOWOPS_GATEWAY_PORT") {
            self.gateway.port = parse_var("FLOWOPS_GATEWAY_PORT", &v)?;
        }
        if let Some(v) = lookup("FLOWOPS_WORKFLOW_SERVICE_URL") {
            self.gateway.workflow_service_url = v;
        }
        if let Some(v) = lookup("FLOWOPS_REQUEST_TIMEOUT_SECS") {
            self.gateway.request_timeout_secs = parse_var("FLOWOPS_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("FLOWOPS_STORE_BACKEND") {
            self.store.backend = parse_var("FLOWOPS_STORE_BACKEND", &v)?;
        }
        if let Some(v) = lookup("FLOWOPS_DATABASE_URL") {
            self.store.url = v;
        }
        if let Some(v) = lookup("FLOWOPS_DATABASE_NAME") {
            self.store.database = Some(v);
        }
        if let Some(v) = lookup("FLOWOPS_QUEUE_URL") {
            self.queue.url = v;
        }
        if let Some(v) = lookup("FLOWOPS_QUEUE_NAME") {
            self.queue.queue_name = v;
        }
        if let Some(v) = lookup("FLOWOPS_ALLOW_ORIGINS") {
            self.cors.origins = split_list(&v);
        }
        if let Some(v) = lookup("FLOWOPS_ALLOW_METHODS") {
            self.cors.methods = split_list(&v);
        }
        if let Some(v) = lookup("FLOWOPS_ALLOW_HEADERS") {
            self.cors.headers = split_list(&v);
        }
        if let Some(v) = lookup("FLOWOPS_ALLOW_CREDENTIALS") {
            self.cors.credentials = parse_var("FLOWOPS_ALLOW_CREDENTIALS", &v)?;
        }
        if let Some(v) = lookup("FLOWOPS_LOG_LEVEL") {
            self.observability.logging.level = v;
        }
        if let Some(v) = lookup("FLOWOPS_LOG_JSON") {
            self.observability.logging.json_format = parse_var("FLOWOPS_LOG_JSON", &v)?;
        }
        Ok(())
    }
}

/// Workflow service listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port.
    #[serde(default = "default_service_port")]
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_service_port(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Base URL of the workflow service.
    #[serde(default = "default_workflow_service_url")]
    pub workflow_service_url: String,

    /// Timeout for a single downstream call in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_gateway_port(),
            workflow_service_url: default_workflow_service_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// CORS allow-lists. `"*"` allows any value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_wildcard")]
    pub origins: Vec<String>,

    #[serde(default = "default_methods")]
    pub methods: Vec<String>,

    #[serde(default = "default_wildcard")]
    pub headers: Vec<String>,

    #[serde(default)]
    pub credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_wildcard(),
            methods: default_methods(),
            headers: default_wildcard(),
            credentials: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_service_port() -> u16 {
    8100
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_workflow_service_url() -> String {
    "http://localhost:8100".to_string()
}

fn default_request_timeout() -> u64 {
    // Must exceed QueueConfig::connect_window() plus the broker ack.
    60
}

fn default_wildcard() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_methods() -> Vec<String> {
    vec!["GET".to_string(), "POST".to_string()]
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| FlowOpsError::Config(format!("Invalid value for {}: {}", key, e)))
}

/// Substitute environment variables in the format ${VAR_NAME}.
fn substitute_env_vars(content: &str) -> Result<String> {
    let mut result = content.to_string();
    let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FlowOpsError::Config(e.to_string()))?;

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    Ok(result)
}
