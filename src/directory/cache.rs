// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persisted resident directory.
//!
//! Every mutation is applied to a copy, the copy is written to the session
//! store, and only then does it become the live directory. A failed write
//! leaves both the persisted and the in-memory directory as they were, so a
//! reload between any two operations never loses an applied change.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::model::{ResidentDirectory, ResidentEntry};
use super::DirectoryError;
use crate::session::{load_json, save_json, SessionSlot, SessionStore};

/// Resident directory shared by the staff screens of one session.
pub struct DirectoryCache {
    store: Arc<dyn SessionStore>,
    directory: Mutex<ResidentDirectory>,
}

impl DirectoryCache {
    /// Load the persisted directory.
    ///
    /// Absent or unreadable state yields an empty directory.
    pub fn load(store: Arc<dyn SessionStore>) -> Self {
        let directory = match load_json(store.as_ref(), SessionSlot::ResidentDirectory) {
            Ok(Some(directory)) => directory,
            Ok(None) => ResidentDirectory::new(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable resident directory");
                ResidentDirectory::new()
            }
        };

        Self {
            store,
            directory: Mutex::new(directory),
        }
    }

    /// Copy of the whole directory.
    pub fn snapshot(&self) -> ResidentDirectory {
        self.live().clone()
    }

    pub fn lookup(&self, building: &str, unit: &str) -> Vec<ResidentEntry> {
        self.live().lookup(building, unit).to_vec()
    }

    /// Building and unit currently holding `id`.
    pub fn locate(&self, id: &str) -> Option<(String, String)> {
        self.live()
            .locate(id)
            .map(|found| (found.building.to_string(), found.unit.to_string()))
    }

    pub fn find_by_name(&self, building: &str, unit: &str, name: &str) -> Option<ResidentEntry> {
        self.live().find_by_name(building, unit, name).cloned()
    }

    /// Overwrite with a freshly fetched directory.
    pub fn replace(&self, directory: ResidentDirectory) -> Result<(), DirectoryError> {
        self.mutate(|live| *live = directory)
    }

    pub fn upsert(&self, building: &str, unit: &str, name: &str, id: &str) -> Result<bool, DirectoryError> {
        self.mutate(|live| live.upsert(building, unit, name, id))
    }

    pub fn remove(&self, building: &str, unit: &str, id: &str) -> Result<Option<ResidentEntry>, DirectoryError> {
        self.mutate(|live| live.remove(building, unit, id))
    }

    /// Remove `id` wherever it is.
    pub fn remove_resident(&self, id: &str) -> Result<Option<ResidentEntry>, DirectoryError> {
        self.mutate(|live| {
            let (building, unit) = live
                .locate(id)
                .map(|found| (found.building.to_string(), found.unit.to_string()))?;
            live.remove(&building, &unit, id)
        })
    }

    /// Put `id` under `building`/`unit` with `name`, leaving any other unit.
    pub fn relocate(&self, id: &str, building: &str, unit: &str, name: &str) -> Result<(), DirectoryError> {
        self.mutate(|live| {
            let previous = live
                .locate(id)
                .map(|found| (found.building.to_string(), found.unit.to_string()));
            if let Some((old_building, old_unit)) = previous {
                if old_building != building || old_unit != unit {
                    live.remove(&old_building, &old_unit, id);
                }
            }
            live.upsert(building, unit, name, id);
        })
    }

    /// Drop the in-memory copy. The caller owns clearing the store.
    pub fn forget(&self) {
        *self.live() = ResidentDirectory::new();
    }

    fn live(&self) -> MutexGuard<'_, ResidentDirectory> {
        // Live state is only ever swapped whole, so a poisoned lock still
        // guards a consistent directory.
        self.directory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<R>(&self, apply: impl FnOnce(&mut ResidentDirectory) -> R) -> Result<R, DirectoryError> {
        let mut live = self.live();
        let mut next = live.clone();
        let result = apply(&mut next);

        if let Err(e) = save_json(self.store.as_ref(), SessionSlot::ResidentDirectory, &next) {
            warn!(error = %e, "Failed to persist resident directory");
            return Err(e.into());
        }

        debug!(residents = next.len(), "Persisted resident directory");
        *live = next;
        Ok(result)
    }
}
