// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for callers presenting an identity token.
//!
//! The token travels as `Authorization: Bearer <token>` and is verified on
//! every request against the server's [`TokenVerifier`](super::TokenVerifier):
//!
//! ```rust,ignore
//! async fn issue_code(Staff(staff): Staff, Json(body): Json<IssueRequest>) -> impl IntoResponse {
//!     // staff.role is Role::Staff
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use super::claims::TokenClaims;
use crate::error::ApiError;
use crate::state::AppState;

/// Any caller holding a valid token, resident or staff.
pub struct Authenticated(pub TokenClaims);

/// A caller whose valid token carries the staff role.
pub struct Staff(pub TokenClaims);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = state.verifier.verify(token)?;
        Ok(Authenticated(claims))
    }
}

impl FromRequestParts<AppState> for Staff {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Authenticated(claims) = Authenticated::from_request_parts(parts, state).await?;

        if !claims.role.is_staff() {
            warn!(subject = %claims.sub, role = %claims.role, "Staff endpoint called without staff role");
            return Err(ApiError::forbidden("Staff role required"));
        }

        Ok(Staff(claims))
    }
}

/// The token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    use crate::token::fixtures::{test_signing_key, test_verifying_key};
    use crate::token::{issue, Role, TokenVerifier};

    fn state() -> AppState {
        AppState::new(TokenVerifier::new(test_verifying_key()), None)
    }

    fn claims(role: Role) -> TokenClaims {
        TokenClaims {
            sub: "3".to_string(),
            role,
            name: "J.Smith".to_string(),
            bld: "A".to_string(),
            unit: "1".to_string(),
            ic: 3,
            iss: "admin-1".to_string(),
        }
    }

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let err = Authenticated::from_request_parts(&mut parts(None), &state())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_header_is_unauthorized() {
        let err = Authenticated::from_request_parts(&mut parts(Some("Basic abc")), &state())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bad_token_is_unauthorized() {
        let err = Authenticated::from_request_parts(&mut parts(Some("Bearer not-a-jwt")), &state())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn resident_is_authenticated_but_not_staff() {
        let token = issue(&claims(Role::Resident), &test_signing_key()).unwrap();
        let header = format!("Bearer {token}");

        let Authenticated(found) = Authenticated::from_request_parts(&mut parts(Some(&header)), &state())
            .await
            .ok()
            .unwrap();
        assert_eq!(found.role, Role::Resident);

        let err = Staff::from_request_parts(&mut parts(Some(&header)), &state())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn staff_token_passes() {
        let token = issue(&claims(Role::Staff), &test_signing_key()).unwrap();
        let header = format!("Bearer {token}");
        let Staff(found) = Staff::from_request_parts(&mut parts(Some(&header)), &state())
            .await
            .ok()
            .unwrap();
        assert_eq!(found.name, "J.Smith");
    }
}
