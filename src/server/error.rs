use crate::utils::error::AgentError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error response body: `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    /// Maps an error to its status, prefixing the detail of server-side
    /// failures with what was being attempted.
    pub fn with_context(context: &str, err: AgentError) -> Self {
        match err {
            AgentError::NotFound { .. } | AgentError::ConversationNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            }
            AgentError::ToolArguments { .. } => {
                Self::new(StatusCode::BAD_REQUEST, format!("{}: {}", context, err))
            }
            other => {
                tracing::error!(
                    "{}: {} (Category: {:?}, Severity: {:?})",
                    context,
                    other,
                    other.category(),
                    other.severity()
                );
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{}: {}", context, other),
                )
            }
        }
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        Self::with_context("Internal error", err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
