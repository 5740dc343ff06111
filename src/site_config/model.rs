// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};

/// One selectable value. `label` falls back to `value` for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
        }
    }

    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    #[serde(default)]
    pub buildings: Vec<SelectOption>,
    #[serde(default)]
    pub inventory_types: Vec<SelectOption>,
    #[serde(default)]
    pub inventory_locations: Vec<SelectOption>,
}

impl SiteConfig {
    /// Building forms start on.
    pub fn default_building(&self) -> Option<&str> {
        self.buildings.first().map(|b| b.value.as_str())
    }

    pub fn has_building(&self, building: &str) -> bool {
        self.buildings.iter().any(|b| b.value == building)
    }

    pub fn has_inventory_type(&self, item_type: &str) -> bool {
        self.inventory_types.iter().any(|t| t.value == item_type)
    }
}
