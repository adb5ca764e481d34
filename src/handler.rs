use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::error::{FetchImagesError, Operation};
use crate::extract;
use crate::fetch;
use crate::models::{ExtractRequest, ExtractResponse};

const IMG_URL_PARAM: &str = "imgUrl";

#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/fetch-images",
            post(extract_endpoint)
                .get(proxy_endpoint)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

// ── POST: extract image URLs ─────────────────────────────────────────────────

async fn extract_endpoint(
    State(state): State<AppState>,
    body: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, FetchImagesError> {
    // An unreadable body has no usable URL, which fails the same way a bad fetch does.
    let url = match body {
        Ok(Json(ExtractRequest { url: Some(url) })) => Ok(url),
        Ok(_) => Err("request has no url".to_string()),
        Err(rejection) => Err(rejection.body_text()),
    }
    .map_err(|cause| FetchImagesError::upstream(Operation::Extract, cause))?;

    tracing::debug!(%url, "extracting image urls");
    let html = fetch::fetch_page(&state.client, &url).await?;
    let image_urls = extract::extract_image_urls(&html, &url)?;
    tracing::debug!(%url, count = image_urls.len(), "extracted image urls");

    Ok(Json(ExtractResponse { image_urls }))
}

// ── GET: proxy image bytes ───────────────────────────────────────────────────

async fn proxy_endpoint(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, FetchImagesError> {
    let Ok(Query(params)) = query else {
        return Err(FetchImagesError::InvalidImageUrl);
    };
    let img_url = single_img_url(&params).ok_or(FetchImagesError::InvalidImageUrl)?;

    tracing::debug!(%img_url, "proxying image");
    let image = fetch::fetch_image(&state.client, img_url).await?;
    tracing::debug!(
        %img_url,
        bytes = image.bytes.len(),
        content_type = ?image.content_type,
        "proxied image"
    );

    Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes).into_response())
}

/// The `imgUrl` value, if it occurs exactly once and is non-empty. A repeated
/// parameter is a list rather than a string and is rejected.
fn single_img_url(params: &[(String, String)]) -> Option<&str> {
    let mut values = params
        .iter()
        .filter(|(k, _)| k == IMG_URL_PARAM)
        .map(|(_, v)| v.as_str());
    match (values.next(), values.next()) {
        (Some(v), None) if !v.is_empty() => Some(v),
        _ => None,
    }
}

// ── Everything else ──────────────────────────────────────────────────────────

async fn method_not_allowed(method: Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST, GET")],
        format!("Method {} Not Allowed", method),
    )
        .into_response()
}
