// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key-value slots holding one session's persisted state.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Mutex;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error type for session store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A writer panicked while holding the store lock
    #[error("Session store lock poisoned")]
    Poisoned,
    /// Storage not initialized
    #[error("Session store not initialized")]
    NotInitialized,
}

/// Result type for session store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// The named slots a session persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionSlot {
    /// Signed token text as presented at login
    Jwt,
    /// Claims decoded from that token
    AuthInfo,
    /// Building -> unit -> residents
    ResidentDirectory,
    /// Option lists fetched from the site-config service
    SiteConfig,
}

impl SessionSlot {
    pub const ALL: [SessionSlot; 4] = [
        SessionSlot::Jwt,
        SessionSlot::AuthInfo,
        SessionSlot::ResidentDirectory,
        SessionSlot::SiteConfig,
    ];

    /// Storage key, shared with the browser client.
    pub fn key(self) -> &'static str {
        match self {
            SessionSlot::Jwt => "authJWT",
            SessionSlot::AuthInfo => "authInfo",
            SessionSlot::ResidentDirectory => "resDir",
            SessionSlot::SiteConfig => "siteConfig",
        }
    }
}

impl fmt::Display for SessionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Persistence behind the session, directory cache and site-config cache.
///
/// Implementations are injected; nothing reaches for ambient global state.
pub trait SessionStore: Send + Sync {
    fn get(&self, slot: SessionSlot) -> StorageResult<Option<Value>>;

    fn set(&self, slot: SessionSlot, value: Value) -> StorageResult<()>;

    /// Remove every slot in one step.
    fn clear(&self) -> StorageResult<()>;
}

/// Read a slot and deserialize it.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn SessionStore,
    slot: SessionSlot,
) -> StorageResult<Option<T>> {
    match store.get(slot)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serialize a value into a slot.
pub fn save_json<T: Serialize>(
    store: &dyn SessionStore,
    slot: SessionSlot,
    value: &T,
) -> StorageResult<()> {
    store.set(slot, serde_json::to_value(value)?)
}

/// Session store that lives and dies with the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slots: Mutex<HashMap<SessionSlot, Value>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, slot: SessionSlot) -> StorageResult<Option<Value>> {
        let slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(slots.get(&slot).cloned())
    }

    fn set(&self, slot: SessionSlot, value: Value) -> StorageResult<()> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        slots.insert(slot, value);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        slots.clear();
        Ok(())
    }
}
