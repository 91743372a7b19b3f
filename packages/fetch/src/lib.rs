#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP retry helpers shared by the gridstats API clients.
//!
//! Every collaborator client (geocoder, TIGERweb, Census Data API, LODES)
//! sends requests through [`send_json`], [`send_text`], or [`send_bytes`]
//! instead of calling `reqwest::RequestBuilder::send()` directly, so all
//! external traffic gets the same bounded retry with exponential backoff
//! for transient failures (timeouts, connection resets, HTTP 429, 5xx).
//!
//! ```ignore
//! let body = gridstats_fetch::send_json(|| client.get(&url).query(&params)).await?;
//! ```

use std::time::Duration;

use thiserror::Error;

/// Maximum retry attempts for transient HTTP errors. With exponential
/// backoff (2s, 4s, 8s) the total wait before giving up is 14 seconds.
const MAX_RETRIES: u32 = 3;

/// Maximum length of the response body preview included in error messages.
const BODY_PREVIEW_LEN: usize = 300;

/// Errors from HTTP fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed after all retries.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-retryable or retry-exhausted status code.
    #[error("HTTP status {status}: {url}")]
    Status {
        /// The status code returned.
        status: reqwest::StatusCode,
        /// The request URL.
        url: String,
    },

    /// Response body could not be parsed as JSON.
    #[error("JSON parse error from {url}: {message}")]
    Json {
        /// The request URL.
        url: String,
        /// Parse failure description with a body preview.
        message: String,
    },
}

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`], since builders are consumed by
/// `.send()`. This allows retrying any request shape.
///
/// # Errors
///
/// Returns [`FetchError`] if the request fails after all retries, the
/// server returns a non-retryable status, or the body is not valid JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(build_request: F) -> Result<serde_json::Value, FetchError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request).await?;
    let url = response.url().to_string();
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|e| {
        let preview = if text.len() > BODY_PREVIEW_LEN {
            &text[..BODY_PREVIEW_LEN]
        } else {
            &text
        };
        FetchError::Json {
            url,
            message: format!("{e} (body preview: {preview})"),
        }
    })
}

/// Sends an HTTP request and returns the response body as a `String`.
///
/// # Errors
///
/// Returns [`FetchError`] if the request fails after all retries or the
/// server returns a non-retryable status.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(build_request: F) -> Result<String, FetchError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request).await?;
    Ok(response.text().await?)
}

/// Sends an HTTP request and returns the raw response body.
///
/// Used for binary downloads (gzipped flat files).
///
/// # Errors
///
/// Returns [`FetchError`] if the request fails after all retries or the
/// server returns a non-retryable status.
#[allow(clippy::future_not_send)]
pub async fn send_bytes<F>(build_request: F) -> Result<Vec<u8>, FetchError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request).await?;
    Ok(response.bytes().await?.to_vec())
}

/// Core retry loop shared by the `send_*` helpers.
///
/// Retries transient errors up to [`MAX_RETRIES`] times with exponential
/// backoff and returns the successful [`reqwest::Response`].
#[allow(clippy::future_not_send)]
async fn send_inner<F>(build_request: &F) -> Result<reqwest::Response, FetchError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt); // 2s, 4s, 8s
            log::warn!("  retry {attempt}/{MAX_RETRIES} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < MAX_RETRIES {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(FetchError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                // 429 and 5xx are retryable; other 4xx are permanent.
                let retryable = status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    || status.is_server_error();

                if retryable {
                    if attempt < MAX_RETRIES {
                        log::warn!("  HTTP {status}, retrying");
                        attempt += 1;
                        continue;
                    }
                    return Err(FetchError::Status {
                        status,
                        url: response.url().to_string(),
                    });
                }

                if status.is_client_error() {
                    return Err(FetchError::Status {
                        status,
                        url: response.url().to_string(),
                    });
                }

                return Ok(response);
            }
        }
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}
