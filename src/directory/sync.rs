// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reconciling the cache with the directory service.
//!
//! The service is called first; the cache is patched only once it has
//! answered successfully. A failed call therefore never leaves a local
//! change the server does not have.

use std::sync::Arc;

use tracing::{info, warn};

use super::cache::DirectoryCache;
use super::model::ResidentEntry;
use super::service::{DirectoryService, ResidentRecord};
use super::DirectoryError;
use crate::site_config::SiteConfigCache;

pub struct DirectorySync<S> {
    service: S,
    cache: Arc<DirectoryCache>,
    site_config: Option<Arc<SiteConfigCache>>,
}

impl<S: DirectoryService> DirectorySync<S> {
    pub fn new(service: S, cache: Arc<DirectoryCache>) -> Self {
        Self {
            service,
            cache,
            site_config: None,
        }
    }

    /// Validate building codes against `site_config`.
    pub fn with_site_config(mut self, site_config: Arc<SiteConfigCache>) -> Self {
        self.site_config = Some(site_config);
        self
    }

    pub fn cache(&self) -> &Arc<DirectoryCache> {
        &self.cache
    }

    /// Replace the cache with the service's full directory.
    ///
    /// Returns the number of residents now cached.
    pub async fn refresh(&self) -> Result<usize, DirectoryError> {
        let directory = match self.service.fetch_all().await {
            Ok(directory) => directory,
            Err(e) => {
                warn!(error = %e, "Directory sync failed, keeping cached copy");
                return Err(e);
            }
        };

        let residents = directory.len();
        self.cache.replace(directory)?;
        info!(residents, "Resident directory refreshed");
        Ok(residents)
    }

    /// Create a resident and cache it under its new id.
    pub async fn create_resident(&self, record: &ResidentRecord) -> Result<String, DirectoryError> {
        self.check_building(&record.bld)?;

        let id = self.service.add_resident(record).await?;
        self.cache.upsert(&record.bld, &record.unit, &record.name, &id)?;
        info!(resident_id = %id, building = %record.bld, unit = %record.unit, "Resident created");
        Ok(id)
    }

    /// Update a resident, moving the cached entry if the unit changed.
    pub async fn update_resident(&self, id: &str, record: &ResidentRecord) -> Result<(), DirectoryError> {
        self.check_building(&record.bld)?;

        self.service.update_resident(id, record).await?;
        self.cache.relocate(id, &record.bld, &record.unit, &record.name)?;
        info!(resident_id = id, building = %record.bld, unit = %record.unit, "Resident updated");
        Ok(())
    }

    pub async fn delete_resident(&self, id: &str) -> Result<Option<ResidentEntry>, DirectoryError> {
        self.service.delete_resident(id).await?;
        let removed = self.cache.remove_resident(id)?;
        info!(resident_id = id, cached = removed.is_some(), "Resident deleted");
        Ok(removed)
    }

    fn check_building(&self, building: &str) -> Result<(), DirectoryError> {
        match &self.site_config {
            Some(config) if !config.accepts_building(building) => {
                Err(DirectoryError::UnknownBuilding(building.to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::service::testing::{router, Backend, BEARER};
    use crate::directory::service::HttpDirectoryService;
    use crate::remote::testing::serve;
    use crate::session::{MemorySessionStore, SessionStore};
    use crate::site_config::{SelectOption, SiteConfig};

    async fn fixture() -> (Arc<Backend>, DirectorySync<HttpDirectoryService>) {
        let backend = Arc::new(Backend::default());
        let base = serve(router(backend.clone())).await;
        let service = HttpDirectoryService::new(base, BEARER).unwrap();
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let cache = Arc::new(DirectoryCache::load(store));
        (backend, DirectorySync::new(service, cache))
    }

    fn record(name: &str, bld: &str, unit: &str) -> ResidentRecord {
        ResidentRecord {
            name: name.to_string(),
            bld: bld.to_string(),
            unit: unit.to_string(),
        }
    }

    #[tokio::test]
    async fn local_changes_match_a_later_refresh() {
        let (_backend, sync) = fixture().await;

        let jane = sync.create_resident(&record("Jane Doe", "C", "101")).await.unwrap();
        let john = sync.create_resident(&record("John Roe", "C", "101")).await.unwrap();
        sync.update_resident(&jane, &record("Jane Doe", "C", "102")).await.unwrap();
        sync.delete_resident(&john).await.unwrap();
        let patched = sync.cache().snapshot();

        assert_eq!(sync.refresh().await.unwrap(), 1);
        assert_eq!(sync.cache().lookup("C", "102"), patched.lookup("C", "102"));
        assert_eq!(sync.cache().locate(&jane), Some(("C".to_string(), "102".to_string())));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_cache() {
        let (backend, sync) = fixture().await;
        sync.create_resident(&record("Jane Doe", "C", "101")).await.unwrap();

        *backend.fail.lock().unwrap() = true;
        assert!(matches!(sync.refresh().await, Err(DirectoryError::Sync(_))));
        assert_eq!(sync.cache().lookup("C", "101").len(), 1);
    }

    #[tokio::test]
    async fn failed_create_changes_nothing() {
        let (backend, sync) = fixture().await;
        *backend.fail.lock().unwrap() = true;

        assert!(sync.create_resident(&record("Jane Doe", "C", "101")).await.is_err());
        assert!(sync.cache().snapshot().is_empty());
    }

    #[tokio::test]
    async fn unknown_building_is_rejected_before_calling_service() {
        let (backend, sync) = fixture().await;
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let site_config = Arc::new(SiteConfigCache::load(store));
        site_config
            .replace(SiteConfig {
                buildings: vec![SelectOption::new("C")],
                ..SiteConfig::default()
            })
            .unwrap();
        let sync = sync.with_site_config(site_config);

        assert!(matches!(
            sync.create_resident(&record("Jane Doe", "Q", "1")).await,
            Err(DirectoryError::UnknownBuilding(b)) if b == "Q"
        ));
        assert!(backend.rows.lock().unwrap().is_empty());
    }
}
