// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Directory service of record.

use std::future::Future;

use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::columnar::ColumnarResult;
use super::model::ResidentDirectory;
use super::DirectoryError;
use crate::remote::{ensure_success, http_client, read_json, SyncFailure};

/// Resident fields accepted by add and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResidentRecord {
    pub name: String,
    pub bld: String,
    pub unit: String,
}

/// Operations the directory service of record offers.
///
/// Any failure leaves the caller's cache exactly as it was.
pub trait DirectoryService: Send + Sync {
    fn fetch_all(&self) -> impl Future<Output = Result<ResidentDirectory, DirectoryError>> + Send;

    /// Create a resident and return the id the service assigned.
    fn add_resident(
        &self,
        record: &ResidentRecord,
    ) -> impl Future<Output = Result<String, DirectoryError>> + Send;

    fn update_resident(
        &self,
        id: &str,
        record: &ResidentRecord,
    ) -> impl Future<Output = Result<(), DirectoryError>> + Send;

    fn delete_resident(&self, id: &str) -> impl Future<Output = Result<(), DirectoryError>> + Send;
}

/// Client for the backend's `db/*` endpoints.
#[derive(Debug, Clone)]
pub struct HttpDirectoryService {
    client: reqwest::Client,
    api_root: Url,
    bearer: String,
}

impl HttpDirectoryService {
    /// `bearer` is the staff session token.
    pub fn new(mut api_root: Url, bearer: impl Into<String>) -> Result<Self, SyncFailure> {
        if !api_root.path().ends_with('/') {
            let path = format!("{}/", api_root.path());
            api_root.set_path(&path);
        }

        Ok(Self {
            client: http_client()?,
            api_root,
            bearer: bearer.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SyncFailure> {
        self.api_root
            .join(path)
            .map_err(|e| SyncFailure::transport(path, e))
    }

    async fn send(&self, request: reqwest::RequestBuilder, endpoint: &Url) -> Result<reqwest::Response, SyncFailure> {
        request
            .bearer_auth(&self.bearer)
            .send()
            .await
            .map_err(|e| SyncFailure::transport(endpoint.as_str(), e))
    }
}

impl DirectoryService for HttpDirectoryService {
    async fn fetch_all(&self) -> Result<ResidentDirectory, DirectoryError> {
        let url = self.endpoint("db/getAllResidents")?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        let result: ColumnarResult = read_json(response, url.as_str()).await?;
        ResidentDirectory::from_columnar(&result)
    }

    async fn add_resident(&self, record: &ResidentRecord) -> Result<String, DirectoryError> {
        let url = self.endpoint("db/addResident")?;
        let response = self.send(self.client.post(url.clone()).json(record), &url).await?;
        ensure_success(&response, url.as_str())?;

        let body = response
            .text()
            .await
            .map_err(|e| SyncFailure::decode(url.as_str(), e))?;
        let id: u64 = body
            .trim()
            .parse()
            .map_err(|_| SyncFailure::decode(url.as_str(), format!("expected resident id, got {body:?}")))?;
        Ok(id.to_string())
    }

    async fn update_resident(&self, id: &str, record: &ResidentRecord) -> Result<(), DirectoryError> {
        let url = self.endpoint("db/updateResident")?;
        let request = self.client.post(url.clone()).query(&[("id", id)]).json(record);
        let response = self.send(request, &url).await?;
        ensure_success(&response, url.as_str())?;
        Ok(())
    }

    async fn delete_resident(&self, id: &str) -> Result<(), DirectoryError> {
        let url = self.endpoint("db/deleteResident")?;
        let request = self.client.get(url.clone()).query(&[("id", id)]);
        let response = self.send(request, &url).await?;
        ensure_success(&response, url.as_str())?;
        Ok(())
    }
}
