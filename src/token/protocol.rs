// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Issuing and verifying identity tokens.
//!
//! [`verify`] is the only way to obtain [`TokenClaims`] from a presented
//! code. Every failure comes back as a [`TokenError`]; nothing here panics
//! on attacker-controlled input.

use p256::ecdsa::{SigningKey, VerifyingKey};
use tracing::debug;

use super::claims::{TokenClaims, TokenHeader};
use super::codec::{self, TokenSegments};
use super::error::TokenError;
use super::keys::{import_verifying_key, PROPERTY_PUBLIC_KEY};
use super::signer;

/// Outcome of verifying a presented code.
pub type Verification = Result<TokenClaims, TokenError>;

/// Build, sign and serialise a token for `claims`.
pub fn issue(claims: &TokenClaims, signing_key: &SigningKey) -> Result<String, TokenError> {
    let header = codec::encode_segment(&TokenHeader::es256())?;
    let payload = codec::encode_segment(claims)?;
    let segments = TokenSegments {
        header: &header,
        payload: &payload,
        signature: "",
    };
    let canonical = segments.canonical();
    let signature = signer::sign(signing_key, &canonical);

    Ok(format!("{canonical}.{}", codec::encode_signature(&signature)))
}

/// Verify `token` against `public_key` and return its claims.
///
/// The signature is checked over the segment text exactly as presented. The
/// payload is only parsed once the signature holds, so any edit to a signed
/// token reports [`TokenError::SignatureMismatch`].
///
/// Only a wrong segment count is classified as [`TokenError::MalformedToken`]
/// before the signature check. Three segments of undecodable base64 or JSON
/// fail the signature first and report `SignatureMismatch`.
pub fn verify(token: &str, public_key: &VerifyingKey) -> Verification {
    let result = verify_segments(token, public_key);
    if let Err(e) = &result {
        debug!(reason = e.error_code(), "Rejected presented token");
    }
    result
}

/// Import `public_key_pem`, then [`verify`].
pub fn verify_with_pem(token: &str, public_key_pem: &str) -> Verification {
    let segments = codec::split(token)?;
    let key = import_verifying_key(public_key_pem)?;
    verify_segments_with(segments, &key)
}

fn verify_segments(token: &str, public_key: &VerifyingKey) -> Verification {
    let segments = codec::split(token)?;
    verify_segments_with(segments, public_key)
}

fn verify_segments_with(segments: TokenSegments<'_>, public_key: &VerifyingKey) -> Verification {
    let signature = codec::decode_signature(segments.signature).unwrap_or_default();
    if !signer::verify(public_key, &segments.canonical(), &signature) {
        return Err(TokenError::SignatureMismatch);
    }

    codec::decode_segments(segments).map(|decoded| decoded.claims)
}

/// Verification key holder injected into everything that accepts codes.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    key: VerifyingKey,
}

impl TokenVerifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Verifier for a PEM public key.
    pub fn from_pem(pem: &str) -> Result<Self, TokenError> {
        import_verifying_key(pem).map(Self::new)
    }

    /// Verifier for the key embedded in every client.
    pub fn property() -> Result<Self, TokenError> {
        Self::from_pem(PROPERTY_PUBLIC_KEY)
    }

    pub fn key(&self) -> &VerifyingKey {
        &self.key
    }

    pub fn verify(&self, token: &str) -> Verification {
        verify(token, &self.key)
    }
}
