// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Resident Directory
//!
//! Staff screens resolve a building and unit to the residents living there
//! without a round-trip per keystroke. The directory is a nested index:
//!
//! ```text
//! { "C": { "101": [["Jane Doe", "7"], ["John Roe", "8"]] } }
//! ```
//!
//! ## Consistency
//!
//! - A full fetch from the directory service replaces the cache
//! - Create, update and delete patch it once the service has accepted them
//! - Every mutation is persisted before it becomes visible
//! - Logout forgets it along with the rest of the session

pub mod cache;
pub mod columnar;
pub mod error;
pub mod model;
pub mod service;
pub mod sync;

pub use cache::DirectoryCache;
pub use columnar::ColumnarResult;
pub use error::DirectoryError;
pub use model::{ResidentDirectory, ResidentEntry, ResidentLocation};
pub use service::{DirectoryService, HttpDirectoryService, ResidentRecord};
pub use sync::DirectorySync;
