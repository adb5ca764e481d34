use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::config::Config;
use crate::error::{FetchImagesError, Operation};
use crate::models::ProxiedImage;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

// ── Client ───────────────────────────────────────────────────────────────────

/// Builds the shared outbound client. No request timeout is set: a fetch
/// waits until the upstream answers or the transport gives up.
pub fn build_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

    let mut builder = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .user_agent(config.user_agent.as_str())
        .default_headers(headers);

    if config.insecure_ssl {
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build()
}

// ── Page fetch ───────────────────────────────────────────────────────────────

/// Fetches `url` and returns its body as text. The upstream status is not
/// inspected; error pages are returned like any other page.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, FetchImagesError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchImagesError::upstream(Operation::Extract, describe(&e)))?;

    tracing::debug!(status = %response.status(), "page response");

    response
        .text()
        .await
        .map_err(|e| FetchImagesError::upstream(Operation::Extract, describe(&e)))
}

// ── Image fetch ──────────────────────────────────────────────────────────────

/// Fetches `url` into memory. Any non-2xx status is a failure.
pub async fn fetch_image(
    client: &reqwest::Client,
    url: &str,
) -> Result<ProxiedImage, FetchImagesError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchImagesError::upstream(Operation::Proxy, describe(&e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchImagesError::upstream(
            Operation::Proxy,
            format!("upstream returned {} for {}", status, url),
        ));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchImagesError::upstream(Operation::Proxy, describe(&e)))?;

    Ok(ProxiedImage {
        content_type,
        bytes,
    })
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_builder() {
        format!("BuilderError: {}", e)
    } else if e.is_connect() {
        format!("ConnectError: {}", e)
    } else if e.is_timeout() {
        format!("TimeoutError: {}", e)
    } else if e.is_redirect() {
        format!("RedirectError: {}", e)
    } else {
        format!("RequestError: {}", e)
    }
}
