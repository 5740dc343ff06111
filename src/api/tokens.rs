// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::directory::{DirectoryService, HttpDirectoryService, ResidentDirectory, ResidentRecord};
use crate::error::ApiError;
use crate::state::AppState;
use crate::token::{extractor::bearer_token, issue, issuer_tag, Staff, TokenClaims};

/// Request body for POST /api/jwt/getSignedJWT
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueTokenRequest {
    /// Resident id; resolved through the directory service by name when absent
    #[serde(default)]
    pub sub: Option<String>,
    pub name: String,
    pub bld: String,
    pub unit: String,
    /// Issue code; the resident's current code when absent
    #[serde(default)]
    pub ic: Option<u32>,
}

/// Sign a resident code.
///
/// The issuer recorded in the token is always the calling staff member.
#[utoipa::path(
    post,
    path = "/api/jwt/getSignedJWT",
    tag = "Tokens",
    security(("bearer" = [])),
    request_body = IssueTokenRequest,
    responses(
        (status = 200, description = "Signed token", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing fields or unknown building"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not staff"),
        (status = 502, description = "Directory service failed"),
        (status = 503, description = "Issuance not configured")
    )
)]
pub async fn get_signed_jwt(
    Staff(staff): Staff,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<IssueTokenRequest>,
) -> Result<String, ApiError> {
    let signing_key = state
        .signing_key
        .clone()
        .ok_or_else(|| ApiError::service_unavailable("Token issuance is not configured"))?;

    let record = ResidentRecord {
        name: request.name.trim().to_string(),
        bld: request.bld.trim().to_string(),
        unit: request.unit.trim().to_string(),
    };
    if record.name.is_empty() || record.bld.is_empty() || record.unit.is_empty() {
        return Err(ApiError::bad_request("name, bld and unit are required"));
    }
    if let Some(site_config) = &state.site_config {
        if !site_config.accepts_building(&record.bld) {
            return Err(ApiError::new(
                axum::http::StatusCode::BAD_REQUEST,
                "unknown_building",
                format!("Unknown building `{}`", record.bld),
            ));
        }
    }

    let resident_id = match request.sub.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => id.to_string(),
        None => resolve_resident(&state, bearer_token(&headers)?, &record).await?,
    };

    let issue_code = request
        .ic
        .unwrap_or_else(|| state.issue_codes.next_for(&resident_id));
    let claims = TokenClaims::for_resident(
        resident_id,
        record.name,
        record.bld,
        record.unit,
        Some(issue_code),
        &staff,
    );
    let token = issue(&claims, &signing_key)?;

    info!(
        resident_id = %claims.sub,
        issuer = %issuer_tag(&staff),
        issue_code,
        "Issued resident token"
    );
    Ok(token)
}

/// Find the resident by name in their unit, creating them if absent.
async fn resolve_resident(state: &AppState, bearer: &str, record: &ResidentRecord) -> Result<String, ApiError> {
    let root = state
        .directory_root
        .clone()
        .ok_or_else(|| ApiError::bad_request("sub is required when no directory service is configured"))?;
    let service = HttpDirectoryService::new(root, bearer)?;

    let directory: ResidentDirectory = service.fetch_all().await?;
    if let Some(entry) = directory.find_by_name(&record.bld, &record.unit, &record.name) {
        return Ok(entry.id().to_string());
    }

    let id = service.add_resident(record).await?;
    info!(resident_id = %id, building = %record.bld, unit = %record.unit, "Created resident for issuance");
    Ok(id)
}
