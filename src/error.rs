// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::directory::DirectoryError;
use crate::remote::SyncFailure;
use crate::token::TokenError;

/// Error returned by every API handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

/// JSON error body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub error_code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        Self::new(e.status_code(), e.error_code(), e.user_message())
    }
}

impl From<SyncFailure> for ApiError {
    fn from(e: SyncFailure) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "upstream_failure", e.to_string())
    }
}

impl From<DirectoryError> for ApiError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Sync(failure) => failure.into(),
            DirectoryError::UnknownBuilding(_) => Self::new(StatusCode::BAD_REQUEST, "unknown_building", e.to_string()),
            DirectoryError::MissingColumn(_) | DirectoryError::InvalidCell { .. } => {
                Self::new(StatusCode::BAD_GATEWAY, "upstream_failure", e.to_string())
            }
            DirectoryError::Storage(_) => Self::internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code.to_string(),
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_code() {
        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.code, "bad_request");
        assert_eq!(bad.message, "bad");

        assert_eq!(ApiError::unauthorized("x").status, StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status, StatusCode::FORBIDDEN);
        assert_eq!(ApiError::conflict("x").status, StatusCode::CONFLICT);
        assert_eq!(
            ApiError::service_unavailable("x").status,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn token_errors_keep_generic_message() {
        let err = ApiError::from(TokenError::SignatureMismatch);
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, "signature_mismatch");
        assert_eq!(err.message, "There's a problem with this code");

        let err = ApiError::from(TokenError::MalformedToken);
        assert_eq!(err.message, "There's a problem with this code");
    }

    #[test]
    fn sync_failure_is_bad_gateway() {
        let err = ApiError::from(SyncFailure::Status {
            endpoint: "http://ic".to_string(),
            status: 500,
        });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn directory_errors_map_by_cause() {
        let err = ApiError::from(DirectoryError::UnknownBuilding("Q".to_string()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "unknown_building");

        let err = ApiError::from(DirectoryError::MissingColumn("id".to_string()));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data","error_code":"bad_request"}"#);
    }
}
