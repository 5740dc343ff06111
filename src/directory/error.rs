// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use thiserror::Error;

use crate::remote::SyncFailure;
use crate::session::StorageError;

/// Directory cache and directory service errors.
///
/// A resident that is simply not there is never an error; lookups return an
/// empty list and removals of unknown ids succeed.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The cache could not persist a change; the in-memory copy is unchanged
    #[error("Failed to persist directory: {0}")]
    Storage(#[from] StorageError),
    #[error("Result is missing column `{0}`")]
    MissingColumn(String),
    #[error("Row {row} has an unusable `{column}` value")]
    InvalidCell { row: usize, column: String },
    /// Building code not in the site configuration
    #[error("Unknown building `{0}`")]
    UnknownBuilding(String),
    #[error(transparent)]
    Sync(#[from] SyncFailure),
}
