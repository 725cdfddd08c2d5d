use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::debug;

use crate::common::response::ApiError;

pub const GENERIC_FAILURE_MESSAGE: &str = "Error processing video";

#[derive(Debug, Error)]
pub enum DubError {
    #[error("No video file provided")]
    MissingVideo,

    #[error("No target language specified")]
    MissingLanguage,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload exceeds the maximum allowed size")]
    PayloadTooLarge,

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("media tool failed: {0}")]
    MediaTool(String),

    #[error("{service} request failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("{stage} timed out")]
    Timeout { stage: &'static str },

    #[error("speech synthesis returned no audio")]
    NoSynthesizedAudio,
}

impl DubError {
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        DubError::Upstream {
            service,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DubError::MissingVideo | DubError::MissingLanguage | DubError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            DubError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable category reported next to the generic server-side message.
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            DubError::MissingVideo
            | DubError::MissingLanguage
            | DubError::InvalidRequest(_)
            | DubError::PayloadTooLarge => None,
            DubError::Storage(_) => Some("storage"),
            DubError::MediaTool(_) => Some("media_tool"),
            DubError::Upstream { .. } => Some("upstream_service"),
            DubError::Timeout { .. } => Some("timeout"),
            DubError::NoSynthesizedAudio => Some("synthesis"),
        }
    }
}

impl IntoResponse for DubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.kind() {
            None => ApiError::new(self.to_string(), status).into_response(),
            Some(kind) => {
                debug!(kind, "Mapping failure to response: {}", self);
                ApiError::new(GENERIC_FAILURE_MESSAGE, status)
                    .with_kind(kind)
                    .into_response()
            }
        }
    }
}
