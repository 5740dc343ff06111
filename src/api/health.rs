// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// "enabled" when a signing key is configured.
    pub issuance: String,
    /// "local" or "remote".
    pub issue_codes: String,
    /// Site config status, only when a site-config source is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_config: Option<String>,
}

/// Health check endpoint handler.
///
/// Returns 503 while a configured site config has not been fetched yet.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is degraded", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let site_config = state
        .site_config
        .as_ref()
        .map(|cache| if cache.current().is_some() { "ok" } else { "pending" }.to_string());
    let all_ok = site_config.as_deref().map(|s| s == "ok").unwrap_or(true);

    let response = HealthResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            issuance: if state.signing_key.is_some() { "enabled" } else { "disabled" }.to_string(),
            issue_codes: if state.issue_codes.registry().is_some() { "local" } else { "remote" }.to_string(),
            site_config,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::session::{MemorySessionStore, SessionStore};
    use crate::site_config::{SiteConfig, SiteConfigCache};
    use crate::token::fixtures::{test_signing_key, test_verifying_key};
    use crate::token::TokenVerifier;

    fn state() -> AppState {
        AppState::new(TokenVerifier::new(test_verifying_key()), Some(test_signing_key()))
    }

    #[tokio::test]
    async fn healthy_without_site_config() {
        let (status, Json(body)) = health(State(state())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.checks.issuance, "enabled");
        assert_eq!(body.checks.issue_codes, "local");
        assert!(body.checks.site_config.is_none());
    }

    #[tokio::test]
    async fn degraded_until_site_config_arrives() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let cache = Arc::new(SiteConfigCache::load(store));
        let state = state().with_site_config(cache.clone());

        let (status, Json(body)) = health(State(state.clone())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");

        cache.replace(SiteConfig::default()).unwrap();
        let (status, _) = health(State(state)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
