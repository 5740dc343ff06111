// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! On-disk layout of the file-backed session store.
//!
//! ```text
//! {DATA_DIR}/
//!   session/
//!     authJWT.json
//!     authInfo.json
//!     resDir.json
//!     siteConfig.json
//!   session.cleared/     # transient, only while a clear is in progress
//! ```

use std::path::{Path, PathBuf};

use super::store::SessionSlot;

/// Default root for persisted session state.
pub const DATA_ROOT: &str = "./data";

#[derive(Debug, Clone)]
pub struct SessionPaths {
    root: PathBuf,
}

impl Default for SessionPaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl SessionPaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the live slots.
    pub fn session_dir(&self) -> PathBuf {
        self.root.join("session")
    }

    /// Where the slot directory is moved while it is being deleted.
    pub fn cleared_dir(&self) -> PathBuf {
        self.root.join("session.cleared")
    }

    pub fn slot(&self, slot: SessionSlot) -> PathBuf {
        self.session_dir().join(format!("{}.json", slot.key()))
    }
}
