// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Client Session
//!
//! A session is the last verified identity token plus the caches it unlocks,
//! persisted in four named slots:
//!
//! | Slot | Key | Contents |
//! |------|-----|----------|
//! | `Jwt` | `authJWT` | token text as presented |
//! | `AuthInfo` | `authInfo` | decoded claims |
//! | `ResidentDirectory` | `resDir` | building -> unit -> residents |
//! | `SiteConfig` | `siteConfig` | option lists |
//!
//! The session state (unauthenticated, resident, staff) is never stored; it
//! is derived from the verified claims. Logout clears every slot at once.

pub mod auth_state;
pub mod file_store;
pub mod manager;
pub mod paths;
pub mod store;

pub use auth_state::AuthState;
pub use file_store::FileSessionStore;
pub use manager::{Session, SessionError};
pub use paths::SessionPaths;
pub use store::{
    load_json, save_json, MemorySessionStore, SessionSlot, SessionStore, StorageError, StorageResult,
};
