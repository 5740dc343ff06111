// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::future::Future;

use url::Url;

use super::model::SiteConfig;
use crate::remote::{http_client, read_json, SyncFailure};

/// Key lookup: property id -> site configuration.
pub trait SiteConfigService: Send + Sync {
    fn fetch(&self, property_id: &str) -> impl Future<Output = Result<SiteConfig, SyncFailure>> + Send;
}

/// Client for the hosted site-config service (`GET ?prop=`).
#[derive(Debug, Clone)]
pub struct HttpSiteConfigService {
    client: reqwest::Client,
    url: Url,
}

impl HttpSiteConfigService {
    pub fn new(url: Url) -> Result<Self, SyncFailure> {
        Ok(Self {
            client: http_client()?,
            url,
        })
    }
}

impl SiteConfigService for HttpSiteConfigService {
    async fn fetch(&self, property_id: &str) -> Result<SiteConfig, SyncFailure> {
        let endpoint = self.url.as_str();
        let response = self
            .client
            .get(self.url.clone())
            .query(&[("prop", property_id.to_uppercase())])
            .send()
            .await
            .map_err(|e| SyncFailure::transport(endpoint, e))?;
        read_json(response, endpoint).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use axum::{extract::Query, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
    use serde_json::json;

    async fn lookup(Query(params): Query<HashMap<String, String>>) -> axum::response::Response {
        match params.get("prop").map(String::as_str) {
            Some("RIVERSIDE") => Json(json!({
                "buildings": [{"value": "A"}, {"value": "C"}],
                "inventoryTypes": [{"value": "parcel"}],
                "inventoryLocations": [{"value": "lobby"}]
            }))
            .into_response(),
            Some(other) => (StatusCode::BAD_REQUEST, format!("No data for property \"{other}\"")).into_response(),
            None => (StatusCode::BAD_REQUEST, "Did not receive a \"prop\" search param.").into_response(),
        }
    }

    pub fn router() -> Router {
        Router::new().route("/config", get(lookup))
    }
}
