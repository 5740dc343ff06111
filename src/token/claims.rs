// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token header and identity claims.

use serde::{Deserialize, Serialize};

use super::roles::Role;

/// JWS algorithm name for ECDSA P-256 / SHA-256.
pub const ALGORITHM: &str = "ES256";

/// Issue code assumed when a token carries none.
pub const DEFAULT_ISSUE_CODE: u32 = 1;

/// First token segment. Constant for every token this system issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    #[serde(default)]
    pub typ: String,
}

impl TokenHeader {
    pub fn es256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Identity claims carried in the token payload.
///
/// Field names are the on-the-wire claim names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the resident (or staff) id
    pub sub: String,
    /// `"res"` or `"staff"`
    pub role: Role,
    /// Display name
    pub name: String,
    /// Building code
    pub bld: String,
    /// Unit within the building
    pub unit: String,
    /// Issue code; bumping a resident's code revokes older tokens
    #[serde(default = "default_issue_code")]
    pub ic: u32,
    /// Issuing staff member, `"{name}-{ic}"`
    pub iss: String,
}

fn default_issue_code() -> u32 {
    DEFAULT_ISSUE_CODE
}

impl TokenClaims {
    /// Claims for a resident code issued by `issuer`.
    pub fn for_resident(
        resident_id: impl Into<String>,
        name: impl Into<String>,
        building: impl Into<String>,
        unit: impl Into<String>,
        issue_code: Option<u32>,
        issuer: &TokenClaims,
    ) -> Self {
        Self {
            sub: resident_id.into(),
            role: Role::Resident,
            name: name.into(),
            bld: building.into(),
            unit: unit.into(),
            ic: issue_code.unwrap_or(DEFAULT_ISSUE_CODE),
            iss: issuer_tag(issuer),
        }
    }
}

/// The `iss` value recorded for codes a staff member issues.
pub fn issuer_tag(staff: &TokenClaims) -> String {
    format!("{}-{}", staff.name, staff.ic)
}
