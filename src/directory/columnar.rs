// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Column-oriented query results from the backend's `db/*` endpoints.
//!
//! The service answers with `{"columns": [...], "data": [[...], ...],
//! "index": [...]}`. Fields are located by column name, never by position.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::ResidentDirectory;
use super::DirectoryError;

/// Columns a resident row must carry.
pub const RESIDENT_COLUMNS: [&str; 4] = ["name", "bld", "unit", "id"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnarResult {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Value>>,
    #[serde(default)]
    pub index: Vec<Value>,
}

impl ColumnarResult {
    /// Position of `name` in `columns`.
    pub fn column(&self, name: &str) -> Result<usize, DirectoryError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DirectoryError::MissingColumn(name.to_string()))
    }

    /// Raw cell value; `None` outside the result.
    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.data.get(row).and_then(|r| r.get(column))
    }

    pub(crate) fn invalid_cell(&self, row: usize, column: usize) -> DirectoryError {
        DirectoryError::InvalidCell {
            row,
            column: self.columns.get(column).cloned().unwrap_or_default(),
        }
    }

    /// Text of a cell. Numbers render in their JSON form.
    pub fn text(&self, row: usize, column: usize) -> Result<String, DirectoryError> {
        match self.cell(row, column) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(self.invalid_cell(row, column)),
        }
    }
}

impl ResidentDirectory {
    /// Build a directory from a resident query result.
    ///
    /// A bad row rejects the whole result so nothing partial is applied.
    pub fn from_columnar(result: &ColumnarResult) -> Result<Self, DirectoryError> {
        let [name, bld, unit, id] = RESIDENT_COLUMNS.map(|c| result.column(c));
        let (name, bld, unit, id) = (name?, bld?, unit?, id?);

        let mut directory = ResidentDirectory::new();
        for row in 0..result.data.len() {
            directory.upsert(
                &result.text(row, bld)?,
                &result.text(row, unit)?,
                &result.text(row, name)?,
                &result.text(row, id)?,
            );
        }
        Ok(directory)
    }
}
