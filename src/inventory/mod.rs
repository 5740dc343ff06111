// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Items held at the front desk for residents.
//!
//! Staff record received items against a unit, then hand them over either
//! to a resident whose code was scanned or, with the scan skipped, under the
//! staff member's own name. Collections run through [`InventoryDesk`]:
//! verify the code, check its issue code, then submit.

pub mod desk;
pub mod error;
pub mod model;
pub mod service;

pub use desk::{Collector, InventoryDesk};
pub use error::InventoryError;
pub use model::{ItemRecord, ItemStatus, LogEntry, ReceiptRow};
pub use service::{CollectionSubmission, HttpInventoryService, InventoryQuery, InventoryService};
