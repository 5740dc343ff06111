// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File-backed session store: one JSON document per slot.
//!
//! Writes go to a temp file that is renamed over the slot, so a reader sees
//! either the old or the new value. Clearing renames the whole slot
//! directory away before deleting it, so a crash mid-clear never leaves a
//! half-wiped session behind.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::sync::Mutex;

use serde_json::Value;
use tracing::{debug, warn};

use super::paths::SessionPaths;
use super::store::{SessionSlot, SessionStore, StorageError, StorageResult};

#[derive(Debug)]
pub struct FileSessionStore {
    paths: SessionPaths,
    initialized: bool,
    // Serialises writers against `clear`.
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Create a store rooted at `paths`. Call `initialize()` before use.
    pub fn new(paths: SessionPaths) -> Self {
        Self {
            paths,
            initialized: false,
            write_lock: Mutex::new(()),
        }
    }

    /// Create and initialize in one step.
    pub fn open(paths: SessionPaths) -> StorageResult<Self> {
        let mut store = Self::new(paths);
        store.initialize()?;
        Ok(store)
    }

    pub fn paths(&self) -> &SessionPaths {
        &self.paths
    }

    /// Create the slot directory and finish any interrupted clear.
    ///
    /// Safe to call multiple times.
    pub fn initialize(&mut self) -> StorageResult<()> {
        let cleared = self.paths.cleared_dir();
        if cleared.exists() {
            warn!(path = %cleared.display(), "Finishing interrupted session clear");
            fs::remove_dir_all(&cleared)?;
        }

        fs::create_dir_all(self.paths.session_dir())?;
        self.initialized = true;
        Ok(())
    }

    fn ensure_initialized(&self) -> StorageResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(StorageError::NotInitialized)
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, slot: SessionSlot) -> StorageResult<Option<Value>> {
        self.ensure_initialized()?;

        let file = match File::open(self.paths.slot(slot)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(value))
    }

    fn set(&self, slot: SessionSlot, value: Value) -> StorageResult<()> {
        self.ensure_initialized()?;
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        let path = self.paths.slot(slot);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, &value)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &path)?;

        debug!(slot = %slot, "Persisted session slot");
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.ensure_initialized()?;
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        let live = self.paths.session_dir();
        let cleared = self.paths.cleared_dir();
        if cleared.exists() {
            fs::remove_dir_all(&cleared)?;
        }
        if live.exists() {
            fs::rename(&live, &cleared)?;
        }
        fs::create_dir_all(&live)?;
        fs::remove_dir_all(&cleared)?;

        debug!("Cleared session slots");
        Ok(())
    }
}
