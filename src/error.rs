use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ErrorBody;

const EXTRACT_FAILED: &str = "Failed to fetch images from the URL.";
const PROXY_FAILED: &str = "Failed to fetch image binary.";
const INVALID_IMAGE_URL: &str = "Invalid image URL.";

/// Which operation an upstream failure belongs to; picks the public message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Extract,
    Proxy,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchImagesError {
    #[error("invalid image URL")]
    InvalidImageUrl,
    /// The cause is kept for logs only and never reaches the caller.
    #[error("upstream failure: {cause}")]
    Upstream { op: Operation, cause: String },
}

impl FetchImagesError {
    pub fn upstream(op: Operation, cause: impl ToString) -> Self {
        FetchImagesError::Upstream {
            op,
            cause: cause.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FetchImagesError::InvalidImageUrl => StatusCode::BAD_REQUEST,
            FetchImagesError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            FetchImagesError::InvalidImageUrl => INVALID_IMAGE_URL,
            FetchImagesError::Upstream {
                op: Operation::Extract,
                ..
            } => EXTRACT_FAILED,
            FetchImagesError::Upstream {
                op: Operation::Proxy,
                ..
            } => PROXY_FAILED,
        }
    }
}

impl IntoResponse for FetchImagesError {
    fn into_response(self) -> Response {
        if let FetchImagesError::Upstream { op, cause } = &self {
            tracing::warn!(?op, %cause, "upstream fetch failed");
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
