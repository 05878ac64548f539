//! Mapping of advisor errors onto HTTP responses
//!
//! Every failure leaves the server as `{"error": ..., "kind": ...}` JSON.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::advisor::upstream::UpstreamError;
use crate::utils::error::AdvisorError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

/// Error returned by request handlers
#[derive(Debug)]
pub struct ApiError(pub AdvisorError);

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError(AdvisorError::Validation(message.into()))
    }

    /// Map an extractor rejection, keeping 413 for oversized bodies
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError(AdvisorError::PayloadTooLarge(message.into()))
        } else {
            ApiError::validation(message)
        }
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AdvisorError::Validation(_) => StatusCode::BAD_REQUEST,
            AdvisorError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AdvisorError::Upstream(UpstreamError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error category
    pub fn kind(&self) -> &'static str {
        match &self.0 {
            AdvisorError::Validation(_) => "validation",
            AdvisorError::PayloadTooLarge(_) => "payload_too_large",
            AdvisorError::ModelUnavailable(_) => "model_unavailable",
            AdvisorError::ImageDecode(_) | AdvisorError::Inference(_) => "processing",
            AdvisorError::Upstream(UpstreamError::Timeout(_)) => "upstream_timeout",
            AdvisorError::Upstream(_) => "upstream",
            AdvisorError::Config(_)
            | AdvisorError::ModelLoad(_)
            | AdvisorError::PathNotFound(_)
            | AdvisorError::Io(_) => "internal",
        }
    }

    /// Message shown to the client
    fn message(&self) -> String {
        match &self.0 {
            AdvisorError::ModelUnavailable(_) => "Model not loaded".to_string(),
            // The upstream body can echo request details; it is only logged
            AdvisorError::Upstream(UpstreamError::Status { status, .. }) => {
                format!("Gemini API returned status {}", status)
            }
            AdvisorError::Config(_)
            | AdvisorError::ModelLoad(_)
            | AdvisorError::PathNotFound(_)
            | AdvisorError::Io(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<AdvisorError> for ApiError {
    fn from(err: AdvisorError) -> Self {
        ApiError(err)
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError(AdvisorError::Upstream(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), "Request failed: {}", self.0);
        } else {
            warn!(kind = self.kind(), "Request rejected: {}", self.0);
        }

        let body = ErrorBody {
            error: self.message(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}
