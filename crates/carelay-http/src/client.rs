// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the clinic backend.
//!
//! Provides [`ApiClient`] which handles request construction, bearer
//! authentication, transient error retry for reads, and the global 401
//! session-expiry path.

use std::sync::Arc;
use std::time::Duration;

use carelay_core::CarelayError;
use carelay_config::model::BackendConfig;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::expiry::SharedExpiry;
use crate::session::SessionStore;

/// Delay between retry attempts for idempotent reads.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// HTTP client for backend communication.
///
/// Attaches the session bearer token to every request, maps response
/// statuses onto [`CarelayError`], and funnels every 401 through the shared
/// expiry latch so concurrent failures produce exactly one local side effect.
/// GET requests are retried on transient errors (429, 5xx, transport);
/// writes are never retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    expiry: SharedExpiry,
    max_retries: u32,
    timeout: Duration,
}

impl ApiClient {
    /// Creates a new backend client from the `[backend]` config section.
    pub fn new(
        config: &BackendConfig,
        session: Arc<SessionStore>,
        expiry: SharedExpiry,
    ) -> Result<Self, CarelayError> {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CarelayError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            expiry,
            max_retries: config.max_retries,
            timeout,
        })
    }

    /// The configured backend origin.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session store this client reads its token from.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// The shared session-expiry latch.
    pub fn expiry(&self) -> &SharedExpiry {
        &self.expiry
    }

    pub async fn get(&self, path: &str) -> Result<Value, CarelayError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, CarelayError> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value, CarelayError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, CarelayError> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, CarelayError> {
        self.request(Method::DELETE, path, None).await
    }

    /// Executes a request against the backend.
    ///
    /// `path` is joined onto the configured base URL and may carry a query
    /// string. The response body is parsed as JSON; an empty body decodes to
    /// `Value::Null`. Only GET requests participate in the retry loop.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, CarelayError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let retries = if method == Method::GET { self.max_retries } else { 0 };

        let mut last_error = None;

        for attempt in 0..=retries {
            if attempt > 0 {
                warn!(attempt, url = %url, "retrying request after transient error");
                tokio::time::sleep(RETRY_BACKOFF).await;
            }

            let mut builder = self.http.request(method.clone(), &url);
            if let Some(token) = self.session.token() {
                builder = builder.bearer_auth(token);
            }
            if let Some(ref body) = body {
                builder = builder.json(body);
            }

            let response = match builder.send().await {
                Ok(response) => response,
                Err(e) => {
                    let error = self.map_transport_error(e);
                    if attempt < retries {
                        warn!(error = %error, "transport error, will retry");
                        last_error = Some(error);
                        continue;
                    }
                    return Err(error);
                }
            };

            let status = response.status();
            debug!(status = %status, method = %method, url = %url, attempt, "response received");

            if status.is_success() {
                return decode_body(response).await;
            }

            if status == StatusCode::UNAUTHORIZED {
                // Consume the body so the connection can be reused, then run
                // the one-shot expiry path. Never retried.
                let _ = response.text().await;
                if self.expiry.fire(&self.session) {
                    warn!(url = %url, "backend returned 401, session expired locally");
                }
                return Err(CarelayError::SessionExpired);
            }

            let detail = extract_error_detail(response).await;
            if is_transient_status(status) && attempt < retries {
                warn!(status = %status, detail = %detail, "transient status, will retry");
                last_error = Some(CarelayError::Api {
                    status: status.as_u16(),
                    detail,
                });
                continue;
            }

            return Err(CarelayError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        Err(last_error.unwrap_or_else(|| CarelayError::Transport {
            message: "request failed after retries".into(),
            source: None,
        }))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> CarelayError {
        if e.is_timeout() {
            CarelayError::Timeout {
                duration: self.timeout,
            }
        } else {
            CarelayError::Transport {
                message: format!("request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

/// Reads a successful response body as JSON. Empty bodies become `Null`.
async fn decode_body(response: reqwest::Response) -> Result<Value, CarelayError> {
    let text = response.text().await.map_err(|e| CarelayError::Transport {
        message: format!("failed to read response body: {e}"),
        source: Some(Box::new(e)),
    })?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| CarelayError::Decode {
        message: format!("response body is not valid JSON: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Pulls a human-readable detail out of an error response body.
///
/// The backend is inconsistent here too: errors arrive as `{"error": "..."}`,
/// `{"message": "..."}`, `{"detail": "..."}`, or plain text.
async fn extract_error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(&body) {
        for key in ["error", "message", "detail"] {
            match value.get(key) {
                Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                Some(other) if !other.is_null() => return other.to_string(),
                _ => {}
            }
        }
    }

    // Foreign bytes: truncate by chars, a byte offset can split a code point.
    let trimmed = body.trim();
    let head: String = trimmed.chars().take(200).collect();
    if head.len() < trimmed.len() {
        format!("{head}...")
    } else {
        head
    }
}

/// Returns true for HTTP status codes worth retrying on idempotent reads.
fn is_transient_status(status: StatusCode) -> bool {
    status.as_u16() == 429 || status.is_server_error()
}
