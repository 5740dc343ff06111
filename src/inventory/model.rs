// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Items held for residents and the rows staff submit when receiving them.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::InventoryError;
use crate::directory::model::id_text;
use crate::directory::ColumnarResult;

/// Columns an inventory row must carry.
pub const INVENTORY_COLUMNS: [&str; 8] = [
    "id",
    "type",
    "owner_bld",
    "owner_unit",
    "owner_name",
    "note",
    "status",
    "log",
];

/// Item state, stored as a single letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    #[serde(rename = "s")]
    Special,
    #[serde(rename = "c")]
    Collected,
    #[serde(rename = "w")]
    AwaitingCollection,
    #[serde(rename = "r")]
    Available,
    #[serde(rename = "u")]
    Unavailable,
}

impl ItemStatus {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "s" => Some(Self::Special),
            "c" => Some(Self::Collected),
            "w" => Some(Self::AwaitingCollection),
            "r" => Some(Self::Available),
            "u" => Some(Self::Unavailable),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Special => "s",
            Self::Collected => "c",
            Self::AwaitingCollection => "w",
            Self::Available => "r",
            Self::Unavailable => "u",
        }
    }
}

/// One movement of an item: who moved it, where to, and when (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(deserialize_with = "id_text")]
    pub by: String,
    pub to: String,
    pub ts: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub id: u64,
    pub item_type: String,
    pub status: ItemStatus,
    pub owner_bld: String,
    pub owner_unit: String,
    pub owner_name: String,
    pub note: Option<String>,
    /// Newest first
    pub log: Vec<LogEntry>,
}

impl ItemRecord {
    /// Where the item was last moved to.
    pub fn last_at(&self) -> Option<&str> {
        self.log.first().map(|entry| entry.to.as_str())
    }

    pub fn last_update(&self) -> Option<i64> {
        self.log.first().map(|entry| entry.ts)
    }

    pub fn is_awaiting_collection(&self) -> bool {
        self.status == ItemStatus::AwaitingCollection
    }

    /// Build records from an inventory query result.
    ///
    /// The log cell may arrive as a JSON array or as JSON text.
    pub fn from_columnar(result: &ColumnarResult) -> Result<Vec<Self>, InventoryError> {
        let [id, item_type, bld, unit, name, note, status, log] = INVENTORY_COLUMNS.map(|c| result.column(c));
        let (id, item_type, bld, unit, name, note, status, log) =
            (id?, item_type?, bld?, unit?, name?, note?, status?, log?);

        (0..result.data.len())
            .map(|row| -> Result<Self, InventoryError> {
                let item_id: u64 = result
                    .text(row, id)?
                    .parse()
                    .map_err(|_| result.invalid_cell(row, id))?;
                let item_status = ItemStatus::from_code(&result.text(row, status)?)
                    .ok_or_else(|| result.invalid_cell(row, status))?;
                let item_note = match result.cell(row, note) {
                    None | Some(Value::Null) => None,
                    Some(_) => Some(result.text(row, note)?).filter(|n| !n.is_empty()),
                };
                let mut entries: Vec<LogEntry> = match result.cell(row, log) {
                    Some(Value::String(text)) => serde_json::from_str(text).ok(),
                    Some(value @ Value::Array(_)) => serde_json::from_value(value.clone()).ok(),
                    _ => None,
                }
                .ok_or_else(|| result.invalid_cell(row, log))?;
                entries.sort_by(|a, b| b.ts.cmp(&a.ts));

                Ok(ItemRecord {
                    id: item_id,
                    item_type: result.text(row, item_type)?,
                    status: item_status,
                    owner_bld: result.text(row, bld)?,
                    owner_unit: result.text(row, unit)?,
                    owner_name: result.text(row, name)?,
                    note: item_note,
                    log: entries,
                })
            })
            .collect()
    }
}

/// One received item, sent as `[type, bld, unit, name, location, note]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String, String, String, String, Option<String>)")]
pub struct ReceiptRow {
    pub item_type: String,
    pub bld: String,
    pub unit: String,
    pub name: String,
    pub location: String,
    pub note: Option<String>,
}

impl ReceiptRow {
    /// Every field but the note is required.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("type", &self.item_type),
            ("bld", &self.bld),
            ("unit", &self.unit),
            ("name", &self.name),
            ("location", &self.location),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

impl Serialize for ReceiptRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            &self.item_type,
            &self.bld,
            &self.unit,
            &self.name,
            &self.location,
            &self.note,
        )
            .serialize(serializer)
    }
}

impl From<(String, String, String, String, String, Option<String>)> for ReceiptRow {
    fn from((item_type, bld, unit, name, location, note): (String, String, String, String, String, Option<String>)) -> Self {
        Self {
            item_type,
            bld,
            unit,
            name,
            location,
            note,
        }
    }
}
