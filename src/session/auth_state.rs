// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session state derived from the verified token's role.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::token::{Role, TokenClaims};

/// Which surface a session may reach. Ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AuthState {
    Unauthenticated = 0,
    Resident = 1,
    Staff = 2,
}

impl AuthState {
    /// Derive the state from verified claims. Absent claims fail closed.
    pub fn derive(claims: Option<&TokenClaims>) -> Self {
        match claims.map(|c| &c.role) {
            Some(Role::Resident) => AuthState::Resident,
            Some(Role::Staff) => AuthState::Staff,
            Some(Role::Unknown(_)) | None => AuthState::Unauthenticated,
        }
    }

    /// Derive the state from a raw payload document.
    ///
    /// Total over any JSON value: only a string `role` of `"res"` or
    /// `"staff"` grants anything.
    pub fn from_payload(payload: Option<&Value>) -> Self {
        let role = payload
            .and_then(|p| p.get("role"))
            .and_then(Value::as_str)
            .map(Role::from);

        match role {
            Some(Role::Resident) => AuthState::Resident,
            Some(Role::Staff) => AuthState::Staff,
            _ => AuthState::Unauthenticated,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_authenticated(self) -> bool {
        self != AuthState::Unauthenticated
    }
}
