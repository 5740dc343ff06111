// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use thiserror::Error;

use crate::directory::DirectoryError;
use crate::remote::SyncFailure;
use crate::token::TokenError;

/// Receiving and collection errors.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Query result missing a column or carrying an unusable cell
    #[error(transparent)]
    Columnar(#[from] DirectoryError),
    #[error(transparent)]
    Sync(#[from] SyncFailure),
    /// Scanned code failed verification
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("Issue code {presented} was revoked; last valid is {last_valid}")]
    Revoked { presented: u32, last_valid: u32 },
    #[error("Only resident codes can collect items")]
    NotResident,
    #[error("Collecting without a scan requires a staff session")]
    StaffRequired,
    #[error("Receipt row {row} is missing `{field}`")]
    IncompleteReceipt { row: usize, field: &'static str },
    #[error("Unknown building `{0}`")]
    UnknownBuilding(String),
    #[error("Unknown item type `{0}`")]
    UnknownItemType(String),
    #[error("No items selected")]
    NothingSelected,
}
