// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared plumbing for the external services this crate talks to.
//!
//! The directory service, the site-config service and the issue-code service
//! are all plain HTTPS endpoints. A failed call never mutates local state;
//! callers keep whatever they had and treat it as possibly stale.

use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Request timeout for every external call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A call to an external service that produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncFailure {
    /// Connection, TLS or timeout failure
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    /// Non-success HTTP status
    #[error("HTTP {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },
    /// Success status but not a JSON body
    #[error("Expected JSON from {endpoint}")]
    ContentType { endpoint: String },
    /// Body could not be decoded into the expected shape
    #[error("Unreadable response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl SyncFailure {
    pub(crate) fn transport(endpoint: &str, e: impl std::fmt::Display) -> Self {
        SyncFailure::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        }
    }

    pub(crate) fn decode(endpoint: &str, e: impl std::fmt::Display) -> Self {
        SyncFailure::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        }
    }
}

/// Build the HTTP client used for external calls.
pub fn http_client() -> Result<reqwest::Client, SyncFailure> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| SyncFailure::transport("client", e))
}

/// Success status with a JSON content type.
pub fn is_okay_json(response: &Response) -> bool {
    response.status().is_success()
        && response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"))
}

/// Require a success status.
pub(crate) fn ensure_success(response: &Response, endpoint: &str) -> Result<(), SyncFailure> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(SyncFailure::Status {
            endpoint: endpoint.to_string(),
            status: response.status().as_u16(),
        })
    }
}

/// Require a JSON success response and decode it.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    endpoint: &str,
) -> Result<T, SyncFailure> {
    ensure_success(&response, endpoint)?;
    if !is_okay_json(&response) {
        return Err(SyncFailure::ContentType {
            endpoint: endpoint.to_string(),
        });
    }
    response
        .json()
        .await
        .map_err(|e| SyncFailure::decode(endpoint, e))
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};

    async fn fetch(url: url::Url, path: &str) -> Response {
        http_client()
            .unwrap()
            .get(url.join(path).unwrap())
            .send()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn read_json_accepts_json_success() {
        let url = testing::serve(Router::new().route("/ok", get(|| async { Json(json!({"a": 1})) })))
            .await;
        let value: Value = read_json(fetch(url, "ok").await, "ok").await.unwrap();
        assert_eq!(value["a"], 1);
    }

    #[tokio::test]
    async fn read_json_rejects_plain_text() {
        let url = testing::serve(Router::new().route("/text", get(|| async { "{\"a\":1}" }))).await;
        let result: Result<Value, _> = read_json(fetch(url, "text").await, "text").await;
        assert!(matches!(result, Err(SyncFailure::ContentType { .. })));
    }

    #[tokio::test]
    async fn read_json_rejects_error_status() {
        let url = testing::serve(Router::new().route(
            "/fail",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))) }),
        ))
        .await;
        let result: Result<Value, _> = read_json(fetch(url, "fail").await, "fail").await;
        assert!(matches!(result, Err(SyncFailure::Status { status: 500, .. })));
    }
}
