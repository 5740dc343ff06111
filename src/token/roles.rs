// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role claim carried in every identity token.

use serde::{Deserialize, Serialize};

/// Role claim of a token.
///
/// Serialised as the bare claim string (`"res"`, `"staff"`). Anything else is
/// kept verbatim in `Unknown` so the token still decodes, but it never grants
/// a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// A resident of the property (`"res"`)
    Resident,
    /// Property staff (`"staff"`)
    Staff,
    /// Any other claim value
    Unknown(String),
}

impl Role {
    /// The claim string for this role.
    pub fn as_claim(&self) -> &str {
        match self {
            Role::Resident => "res",
            Role::Staff => "staff",
            Role::Unknown(other) => other,
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Staff)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "res" => Role::Resident,
            "staff" => Role::Staff,
            other => Role::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "res" => Role::Resident,
            "staff" => Role::Staff,
            _ => Role::Unknown(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Unknown(other) => other,
            known => known.as_claim().to_string(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_claim())
    }
}
