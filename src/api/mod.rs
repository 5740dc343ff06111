// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{error::ErrorBody, session::AuthState, state::AppState};

pub mod health;
pub mod issue_codes;
pub mod tokens;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/jwt/getSignedJWT", post(tokens::get_signed_jwt))
        .route("/ic/check", get(issue_codes::check))
        .route("/ic/revoke", post(issue_codes::revoke))
        .route("/users/me", get(users::get_current_user));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        tokens::get_signed_jwt,
        issue_codes::check,
        issue_codes::revoke,
        users::get_current_user
    ),
    components(
        schemas(
            ErrorBody,
            AuthState,
            health::HealthResponse,
            health::HealthChecks,
            tokens::IssueTokenRequest,
            issue_codes::RevokeRequest,
            issue_codes::RevokeResponse,
            users::UserMeResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Service status"),
        (name = "Tokens", description = "Resident code issuance"),
        (name = "Issue Codes", description = "Issue-code checks and revocation"),
        (name = "Users", description = "Caller identity")
    )
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
