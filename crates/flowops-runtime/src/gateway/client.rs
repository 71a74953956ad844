use std::time::Duration;

use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;

use flowops_core::config::GatewayConfig;
use flowops_core::error::{FlowOpsError, Result};
use flowops_core::workflow::{NewWorkflow, Workflow};

use crate::http::TRACE_ID_HEADER;

/// HTTP client for the workflow service.
///
/// Transport failures (refused connection, timeout) become
/// `DownstreamUnavailable`. Any non-2xx answer becomes `Downstream` with the
/// service's status and body so callers can relay them unchanged.
#[derive(Debug, Clone)]
pub struct WorkflowServiceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl WorkflowServiceClient {
    /// Create a new client.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            FlowOpsError::Config(format!("Invalid workflow service URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FlowOpsError::Config(format!(
                "Workflow service URL '{}' cannot be used as a base",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FlowOpsError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Self::new(&config.workflow_service_url, config.request_timeout())
    }

    /// Base URL of the workflow service.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub async fn create_workflow(
        &self,
        request: &NewWorkflow,
        trace_id: Option<&str>,
    ) -> Result<Workflow> {
        let url = self.endpoint(&["workflows"])?;
        self.send(self.http.post(url).json(request), trace_id).await
    }

    pub async fn get_workflow(&self, id: &str, trace_id: Option<&str>) -> Result<Workflow> {
        let url = self.endpoint(&["workflows", id])?;
        self.send(self.http.get(url), trace_id).await
    }

    pub async fn list_workflows(&self, trace_id: Option<&str>) -> Result<Vec<Workflow>> {
        let url = self.endpoint(&["workflows"])?;
        self.send(self.http.get(url), trace_id).await
    }

    /// Fetch the service's health report.
    pub async fn health(&self) -> Result<serde_json::Value> {
        let url = self.endpoint(&["health"])?;
        self.send(self.http.get(url), None).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FlowOpsError::Config(format!("Invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        trace_id: Option<&str>,
    ) -> Result<T> {
        let builder = match trace_id {
            Some(trace_id) => builder.header(TRACE_ID_HEADER, trace_id),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Workflow service unreachable");
            FlowOpsError::DownstreamUnavailable(format!("Workflow service unavailable: {}", e))
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                FlowOpsError::Internal(format!("Invalid workflow service response: {}", e))
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            FlowOpsError::DownstreamUnavailable(format!("Workflow service unavailable: {}", e))
        })?;
        let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        });

        tracing::debug!(status = status.as_u16(), "Workflow service returned an error");
        Err(FlowOpsError::Downstream {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> WorkflowServiceClient {
        WorkflowServiceClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://localhost:8100");
        assert_eq!(
            c.endpoint(&["workflows", "abc"]).unwrap().as_str(),
            "http://localhost:8100/workflows/abc"
        );

        let c = client("http://svc:8100/api/");
        assert_eq!(
            c.endpoint(&["workflows"]).unwrap().as_str(),
            "http://svc:8100/api/workflows"
        );
    }

    #[test]
    fn test_endpoint_escapes_id() {
        let c = client("http://localhost:8100");
        assert_eq!(
            c.endpoint(&["workflows", "a/b"]).unwrap().as_str(),
            "http://localhost:8100/workflows/a%2Fb"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = WorkflowServiceClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, FlowOpsError::Config(_)));

        let err = WorkflowServiceClient::new("mailto:ops@example.com", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, FlowOpsError::Config(_)));
    }

    #[tokio::test]
    async fn test_closed_port_is_downstream_unavailable() {
        let c = client("http://127.0.0.1:1");
        let err = c
            .create_workflow(&NewWorkflow::new("wf", "x"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowOpsError::DownstreamUnavailable(_)));
    }
}
