// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token verification errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message shown to whoever presented a bad code.
///
/// Malformed and tampered codes share it so the scanner never tells an
/// attacker which check failed.
pub const GENERIC_CODE_PROBLEM: &str = "There's a problem with this code";

/// Why a presented token was not trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Wrong segment count, bad base64, or a segment that is not the expected JSON
    #[error("Token is malformed")]
    MalformedToken,
    /// The configured key could not be parsed or is not a P-256 key
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),
    /// Structurally valid token whose signature does not verify
    #[error("Token signature is invalid")]
    SignatureMismatch,
}

#[derive(Serialize)]
struct TokenErrorBody {
    error: String,
    error_code: String,
}

impl TokenError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::MalformedToken => "malformed_token",
            TokenError::InvalidKeyMaterial(_) => "invalid_key_material",
            TokenError::SignatureMismatch => "signature_mismatch",
        }
    }

    /// Text safe to show on a scanning screen.
    pub fn user_message(&self) -> &'static str {
        match self {
            TokenError::MalformedToken | TokenError::SignatureMismatch => GENERIC_CODE_PROBLEM,
            TokenError::InvalidKeyMaterial(_) => "Code verification is not configured on this device",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            TokenError::MalformedToken | TokenError::SignatureMismatch => StatusCode::UNAUTHORIZED,
            TokenError::InvalidKeyMaterial(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(TokenErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
