// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::{info, warn};

use super::model::SiteConfig;
use super::service::SiteConfigService;
use crate::remote::SyncFailure;
use crate::session::{load_json, save_json, SessionSlot, SessionStore, StorageError};

#[derive(Debug, Error)]
pub enum SiteConfigError {
    #[error(transparent)]
    Sync(#[from] SyncFailure),
    #[error("Failed to persist site config: {0}")]
    Storage(#[from] StorageError),
}

/// Last known site configuration for the session.
pub struct SiteConfigCache {
    store: Arc<dyn SessionStore>,
    config: RwLock<Option<SiteConfig>>,
}

impl SiteConfigCache {
    /// Load the persisted configuration, if any is readable.
    pub fn load(store: Arc<dyn SessionStore>) -> Self {
        let config = load_json(store.as_ref(), SessionSlot::SiteConfig).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable site config");
            None
        });

        Self {
            store,
            config: RwLock::new(config),
        }
    }

    pub fn current(&self) -> Option<SiteConfig> {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn default_building(&self) -> Option<String> {
        self.current()?.default_building().map(str::to_string)
    }

    /// Whether `building` is acceptable. Anything goes until a config with
    /// at least one building has been fetched.
    pub fn accepts_building(&self, building: &str) -> bool {
        match self.current() {
            Some(config) if !config.buildings.is_empty() => config.has_building(building),
            _ => true,
        }
    }

    /// Whether `item_type` is acceptable, with the same leniency as
    /// [`accepts_building`](Self::accepts_building).
    pub fn accepts_item_type(&self, item_type: &str) -> bool {
        match self.current() {
            Some(config) if !config.inventory_types.is_empty() => config.has_inventory_type(item_type),
            _ => true,
        }
    }

    pub fn replace(&self, config: SiteConfig) -> Result<(), StorageError> {
        let mut live = self.config.write().unwrap_or_else(PoisonError::into_inner);
        save_json(self.store.as_ref(), SessionSlot::SiteConfig, &config)?;
        *live = Some(config);
        Ok(())
    }

    /// Fetch and cache. On failure the previous value stays in place.
    pub async fn refresh<S: SiteConfigService>(
        &self,
        service: &S,
        property_id: &str,
    ) -> Result<SiteConfig, SiteConfigError> {
        let config = match service.fetch(property_id).await {
            Ok(config) => config,
            Err(e) => {
                warn!(property_id, error = %e, "Site config sync failed, keeping last known");
                return Err(e.into());
            }
        };

        self.replace(config.clone())?;
        info!(property_id, buildings = config.buildings.len(), "Site config refreshed");
        Ok(config)
    }

    pub fn forget(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
