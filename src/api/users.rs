// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::session::AuthState;
use crate::token::{Authenticated, TokenClaims};

/// Response for GET /api/users/me
#[derive(Debug, Serialize, ToSchema)]
pub struct UserMeResponse {
    /// Resident or staff id
    pub sub: String,
    pub name: String,
    /// Role claim as carried in the token
    pub role: String,
    pub bld: String,
    pub unit: String,
    /// Session state the role grants
    pub state: AuthState,
}

impl From<TokenClaims> for UserMeResponse {
    fn from(claims: TokenClaims) -> Self {
        Self {
            state: AuthState::derive(Some(&claims)),
            role: claims.role.as_claim().to_string(),
            sub: claims.sub,
            name: claims.name,
            bld: claims.bld,
            unit: claims.unit,
        }
    }
}

/// Identity carried by the caller's token.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller identity", body = UserMeResponse),
        (status = 401, description = "Missing or invalid bearer token"),
    )
)]
pub async fn get_current_user(Authenticated(claims): Authenticated) -> Json<UserMeResponse> {
    Json(claims.into())
}
