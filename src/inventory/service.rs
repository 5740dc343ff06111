// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Inventory endpoints of the backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use url::Url;

use super::model::{ItemRecord, ReceiptRow};
use super::InventoryError;
use crate::directory::ColumnarResult;
use crate::remote::{ensure_success, http_client, read_json, SyncFailure};

/// Items belonging to one unit. The backend matches case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryQuery {
    pub bld: String,
    pub unit: String,
}

/// Items handed over in one collection.
///
/// Without a recipient token the backend records the collection as
/// unverified, made by the staff member whose bearer token sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSubmission {
    pub collected: Vec<u64>,
    #[serde(rename = "recipientJWT", default, skip_serializing_if = "Option::is_none")]
    pub recipient_jwt: Option<String>,
}

pub trait InventoryService: Send + Sync {
    fn query_items(
        &self,
        query: &InventoryQuery,
    ) -> impl Future<Output = Result<Vec<ItemRecord>, InventoryError>> + Send;

    /// Record received items, logged as placed at each row's location.
    fn receive_items(&self, rows: &[ReceiptRow]) -> impl Future<Output = Result<(), InventoryError>> + Send;

    /// Mark items collected. Returns the backend's summary message.
    fn submit_collection(
        &self,
        submission: &CollectionSubmission,
    ) -> impl Future<Output = Result<String, InventoryError>> + Send;
}

/// Client for `db/inventoryQuery`, `db/addInventory` and
/// `db/submitInventoryCollection`.
#[derive(Debug, Clone)]
pub struct HttpInventoryService {
    client: reqwest::Client,
    api_root: Url,
    bearer: String,
}

impl HttpInventoryService {
    /// `bearer` is the staff session token; the backend records it as the
    /// staff member handling the items.
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

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(reqwest::Response, Url), SyncFailure> {
        let url = self
            .api_root
            .join(path)
            .map_err(|e| SyncFailure::transport(path, e))?;
        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.bearer)
            .json(body)
            .send()
            .await
            .map_err(|e| SyncFailure::transport(url.as_str(), e))?;
        Ok((response, url))
    }
}

impl InventoryService for HttpInventoryService {
    async fn query_items(&self, query: &InventoryQuery) -> Result<Vec<ItemRecord>, InventoryError> {
        let (response, url) = self.post("db/inventoryQuery", query).await?;
        let result: ColumnarResult = read_json(response, url.as_str()).await?;
        ItemRecord::from_columnar(&result)
    }

    async fn receive_items(&self, rows: &[ReceiptRow]) -> Result<(), InventoryError> {
        let (response, url) = self.post("db/addInventory", rows).await?;
        ensure_success(&response, url.as_str())?;
        Ok(())
    }

    async fn submit_collection(&self, submission: &CollectionSubmission) -> Result<String, InventoryError> {
        let (response, url) = self.post("db/submitInventoryCollection", submission).await?;
        ensure_success(&response, url.as_str())?;
        let message = response
            .text()
            .await
            .map_err(|e| SyncFailure::decode(url.as_str(), e))?;
        Ok(message)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{self, Backend, BEARER};
    use super::*;
    use crate::inventory::model::ItemStatus;
    use crate::remote::testing::serve;
    use std::sync::Arc;

    fn row(name: &str, unit: &str) -> ReceiptRow {
        ReceiptRow {
            item_type: "parcel".to_string(),
            bld: "C".to_string(),
            unit: unit.to_string(),
            name: name.to_string(),
            location: "Mail room".to_string(),
            note: None,
        }
    }

    async fn service(backend: Arc<Backend>, bearer: &str) -> HttpInventoryService {
        let root = serve(testing::router(backend)).await;
        HttpInventoryService::new(root, bearer).unwrap()
    }

    #[tokio::test]
    async fn receive_then_query_by_unit() {
        let backend = Arc::new(Backend::default());
        let service = service(backend.clone(), BEARER).await;

        service
            .receive_items(&[row("Jane Doe", "101"), row("Ann Lee", "102")])
            .await
            .unwrap();

        let query = InventoryQuery {
            bld: "c".to_string(),
            unit: "101".to_string(),
        };
        let items = service.query_items(&query).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].owner_name, "Jane Doe");
        assert_eq!(items[0].status, ItemStatus::AwaitingCollection);
        assert_eq!(items[0].last_at(), Some("Mail room"));
    }

    #[tokio::test]
    async fn submission_reports_backend_message() {
        let backend = Arc::new(Backend::default());
        let service = service(backend.clone(), BEARER).await;
        service.receive_items(&[row("Jane Doe", "101")]).await.unwrap();

        let message = service
            .submit_collection(&CollectionSubmission {
                collected: vec![1],
                recipient_jwt: None,
            })
            .await
            .unwrap();
        assert_eq!(message, "1 items marked as collected");

        let nothing = service
            .submit_collection(&CollectionSubmission {
                collected: vec![99],
                recipient_jwt: None,
            })
            .await;
        assert!(matches!(
            nothing,
            Err(InventoryError::Sync(SyncFailure::Status { status: 400, .. }))
        ));
    }

    #[tokio::test]
    async fn rejected_bearer_is_a_sync_failure() {
        let service = service(Arc::new(Backend::default()), "nope").await;
        let result = service.receive_items(&[row("Jane Doe", "101")]).await;
        assert!(matches!(
            result,
            Err(InventoryError::Sync(SyncFailure::Status { status: 401, .. }))
        ));
    }
}
