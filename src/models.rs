use axum::body::Bytes;
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub image_urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

/// A relayed upstream resource.
pub struct ProxiedImage {
    pub content_type: HeaderValue,
    pub bytes: Bytes,
}
