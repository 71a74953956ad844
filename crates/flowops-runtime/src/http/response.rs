use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use flowops_core::error::FlowOpsError;

/// Error body returned by every FlowOps endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error kind.
    pub error_type: String,
    /// Additional error details.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error body.
    pub fn new(status: StatusCode, error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            error_type: error_type.into(),
            details: None,
        }
    }

    /// Attach details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Handler error that renders as an [`ErrorResponse`].
#[derive(Debug)]
pub struct ApiError(pub FlowOpsError);

impl ApiError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            FlowOpsError::Validation(_) => StatusCode::BAD_REQUEST,
            FlowOpsError::NotFound(_) | FlowOpsError::WorkflowNotFound(_) => StatusCode::NOT_FOUND,
            FlowOpsError::DownstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            FlowOpsError::Downstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match &self.0 {
            FlowOpsError::Notification { workflow_id, .. } => {
                Some(serde_json::json!({ "workflow_id": workflow_id }))
            }
            FlowOpsError::DownstreamUnavailable(_) => {
                Some(serde_json::json!({ "service": "workflow" }))
            }
            _ => None,
        }
    }

    /// Client-facing message. Store and internal failures keep driver text out
    /// of the response; the full error is logged instead.
    fn message(&self) -> String {
        match &self.0 {
            FlowOpsError::Persistence(_) => "The workflow store is unavailable".to_string(),
            FlowOpsError::Config(_)
            | FlowOpsError::Serialization(_)
            | FlowOpsError::Io(_)
            | FlowOpsError::Internal(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        }
    }

    /// Build the error body.
    pub fn body(&self) -> ErrorResponse {
        if let FlowOpsError::Downstream { status, body } = &self.0 {
            // Relay the workflow service's own error body when it has our shape.
            if let Ok(relayed) = serde_json::from_value::<ErrorResponse>(body.clone()) {
                return relayed;
            }
            return ErrorResponse::new(
                self.status_code(),
                self.0.error_type(),
                format!("Workflow service responded with status {}", status),
            )
            .with_details(body.clone());
        }

        let body = ErrorResponse::new(self.status_code(), self.0.error_type(), self.message());
        match self.details() {
            Some(details) => body.with_details(details),
            None => body,
        }
    }
}

impl From<FlowOpsError> for ApiError {
    fn from(err: FlowOpsError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(FlowOpsError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.body();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error_type = %body.error_type, "{}", self.0);
        } else {
            tracing::warn!(status = status.as_u16(), error_type = %body.error_type, "{}", self.0);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (FlowOpsError::Validation("".into()), StatusCode::BAD_REQUEST),
            (FlowOpsError::NotFound("".into()), StatusCode::NOT_FOUND),
            (FlowOpsError::WorkflowNotFound("x".into()), StatusCode::NOT_FOUND),
            (FlowOpsError::Persistence("".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (FlowOpsError::Publish("".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                FlowOpsError::Notification {
                    workflow_id: "x".into(),
                    message: "".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (FlowOpsError::DownstreamUnavailable("".into()), StatusCode::BAD_GATEWAY),
            (FlowOpsError::Internal("".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status_code(), expected);
        }
    }

    #[test]
    fn test_notification_body_carries_workflow_id() {
        let body = ApiError(FlowOpsError::Notification {
            workflow_id: "wf-9".into(),
            message: "broker down".into(),
        })
        .body();

        assert_eq!(body.status_code, 500);
        assert_eq!(body.error_type, "NOTIFICATION_ERROR");
        assert_eq!(body.details, Some(serde_json::json!({ "workflow_id": "wf-9" })));
    }

    #[test]
    fn test_downstream_error_body_is_relayed() {
        let downstream = ErrorResponse::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Workflow with ID x not found");
        let err = ApiError(FlowOpsError::Downstream {
            status: 404,
            body: serde_json::to_value(&downstream).unwrap(),
        });

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.body(), downstream);
    }

    #[test]
    fn test_foreign_downstream_body_is_wrapped() {
        let err = ApiError(FlowOpsError::Downstream {
            status: 503,
            body: serde_json::json!("upstream overloaded"),
        });

        let body = err.body();
        assert_eq!(body.status_code, 503);
        assert_eq!(body.error_type, "DOWNSTREAM_ERROR");
        assert_eq!(body.details, Some(serde_json::json!("upstream overloaded")));
    }

    #[test]
    fn test_error_response_serialization() {
        let body = ErrorResponse::new(StatusCode::BAD_GATEWAY, "DOWNSTREAM_UNAVAILABLE", "down");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status_code"], 502);
        assert_eq!(json["error_type"], "DOWNSTREAM_UNAVAILABLE");
        assert!(json["details"].is_null());
    }

    #[test]
    fn test_server_errors_hide_driver_text() {
        let body = ApiError(FlowOpsError::Internal("pool timed out: PoolTimedOut".into())).body();
        assert_eq!(body.status_code, 500);
        assert_eq!(body.error_type, "INTERNAL_SERVER_ERROR");
        assert_eq!(body.message, "An unexpected error occurred");

        let body = ApiError(FlowOpsError::Persistence(
            "Failed to insert workflow: error returned from database: relation does not exist".into(),
        ))
        .body();
        assert_eq!(body.error_type, "PERSISTENCE_ERROR");
        assert!(!body.message.contains("relation"));
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let body = ApiError(FlowOpsError::Validation("script must not be empty".into())).body();
        assert_eq!(body.message, "Validation error: script must not be empty");
    }
}
