// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Issue-code check and revocation.
//!
//! `GET /api/ic/check` answers in the same shape as the hosted issue-code
//! service, so clients can point at either.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::state::AppState;
use crate::token::{issuer_tag, IssueCodeService, IssueCodeStatus, Staff};

#[derive(Debug, Deserialize, IntoParams)]
pub struct CheckQuery {
    /// Resident id
    pub rid: String,
    /// Issue code presented
    pub ic: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RevokeRequest {
    /// Resident whose earlier codes are revoked
    pub rid: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RevokeResponse {
    pub rid: String,
    /// The only code accepted from now on
    pub ic: u32,
    pub revoked_at: DateTime<Utc>,
}

/// Check whether an issue code is still current.
#[utoipa::path(
    get,
    path = "/api/ic/check",
    tag = "Issue Codes",
    params(CheckQuery),
    responses(
        (status = 200, description = "Code is valid"),
        (status = 401, description = "Code revoked: `Last valid: N; Supplied: M`", body = String, content_type = "text/plain"),
        (status = 502, description = "Hosted issue-code service failed")
    )
)]
pub async fn check(State(state): State<AppState>, Query(query): Query<CheckQuery>) -> Result<Response, ApiError> {
    let response = match state.issue_codes.check(&query.rid, query.ic).await? {
        IssueCodeStatus::Valid => StatusCode::OK.into_response(),
        IssueCodeStatus::Revoked { last_valid } => (
            StatusCode::UNAUTHORIZED,
            format!("Last valid: {last_valid}; Supplied: {}", query.ic),
        )
            .into_response(),
    };
    Ok(response)
}

/// Revoke every code issued so far for a resident.
#[utoipa::path(
    post,
    path = "/api/ic/revoke",
    tag = "Issue Codes",
    security(("bearer" = [])),
    request_body = RevokeRequest,
    responses(
        (status = 200, description = "New current code", body = RevokeResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not staff"),
        (status = 409, description = "Codes are managed by the hosted service")
    )
)]
pub async fn revoke(
    Staff(staff): Staff,
    State(state): State<AppState>,
    Json(request): Json<RevokeRequest>,
) -> Result<Json<RevokeResponse>, ApiError> {
    let registry = state
        .issue_codes
        .registry()
        .ok_or_else(|| ApiError::conflict("Issue codes are managed by the hosted service"))?;
    let ic = registry
        .revoke(&request.rid)
        .ok_or_else(|| ApiError::internal("Issue code store unavailable"))?;

    info!(resident_id = %request.rid, issue_code = ic, by = %issuer_tag(&staff), "Issue code revoked");
    Ok(Json(RevokeResponse {
        rid: request.rid,
        ic,
        revoked_at: Utc::now(),
    }))
}
