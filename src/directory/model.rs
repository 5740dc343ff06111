// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Building -> unit -> residents index.

use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One resident in a unit, serialised as `[name, id]`.
///
/// Ids written as JSON numbers are read back as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentEntry(pub String, #[serde(deserialize_with = "id_text")] pub String);

/// Read an id that may have been written as a JSON string or number.
pub(crate) fn id_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::invalid_type(
            de::Unexpected::Other(&other.to_string()),
            &"an id string or number",
        )),
    }
}

impl ResidentEntry {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self(name.into(), id.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn id(&self) -> &str {
        &self.1
    }
}

/// Where a resident currently sits in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentLocation<'a> {
    pub building: &'a str,
    pub unit: &'a str,
    pub entry: &'a ResidentEntry,
}

/// Nested resident index.
///
/// Within one building and unit, resident ids are unique. Entries keep
/// insertion order; buildings and units are ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResidentDirectory {
    buildings: BTreeMap<String, BTreeMap<String, Vec<ResidentEntry>>>,
}

impl ResidentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Total number of resident entries.
    pub fn len(&self) -> usize {
        self.buildings
            .values()
            .flat_map(|units| units.values())
            .map(Vec::len)
            .sum()
    }

    pub fn buildings(&self) -> impl Iterator<Item = &str> {
        self.buildings.keys().map(String::as_str)
    }

    pub fn units(&self, building: &str) -> impl Iterator<Item = &str> {
        self.buildings
            .get(building)
            .into_iter()
            .flat_map(|units| units.keys().map(String::as_str))
    }

    /// Residents of one unit. Empty when the building or unit is unknown.
    pub fn lookup(&self, building: &str, unit: &str) -> &[ResidentEntry] {
        self.buildings
            .get(building)
            .and_then(|units| units.get(unit))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Rename the entry with `id` in place, or append a new one.
    ///
    /// Returns `true` when a new entry was appended.
    pub fn upsert(&mut self, building: &str, unit: &str, name: &str, id: &str) -> bool {
        let residents = self
            .buildings
            .entry(building.to_string())
            .or_default()
            .entry(unit.to_string())
            .or_default();

        match residents.iter_mut().find(|entry| entry.id() == id) {
            Some(entry) => {
                entry.0 = name.to_string();
                false
            }
            None => {
                residents.push(ResidentEntry::new(name, id));
                true
            }
        }
    }

    /// Remove the entry with `id`. Missing building, unit or id is a no-op.
    pub fn remove(&mut self, building: &str, unit: &str, id: &str) -> Option<ResidentEntry> {
        let residents = self.buildings.get_mut(building)?.get_mut(unit)?;
        let position = residents.iter().position(|entry| entry.id() == id)?;
        Some(residents.remove(position))
    }

    /// Find a resident by id anywhere in the directory.
    pub fn locate(&self, id: &str) -> Option<ResidentLocation<'_>> {
        self.buildings.iter().find_map(|(building, units)| {
            units.iter().find_map(|(unit, residents)| {
                residents
                    .iter()
                    .find(|entry| entry.id() == id)
                    .map(|entry| ResidentLocation {
                        building,
                        unit,
                        entry,
                    })
            })
        })
    }

    /// Case-insensitive name match within one unit.
    pub fn find_by_name(&self, building: &str, unit: &str, name: &str) -> Option<&ResidentEntry> {
        let wanted = name.trim().to_lowercase();
        self.lookup(building, unit)
            .iter()
            .find(|entry| entry.name().trim().to_lowercase() == wanted)
    }
}
