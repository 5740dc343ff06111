// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Three-segment token text form.
//!
//! A token is `base64url(header) "." base64url(payload) "." base64url(signature)`.
//! Segments are kept as the exact text that was presented: the signature is
//! checked over those bytes, never over a re-serialisation of the parsed JSON.

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD},
        DecodePaddingMode,
    },
    Engine,
};
use serde::{de::DeserializeOwned, Serialize};

use super::claims::{TokenClaims, TokenHeader};
use super::error::TokenError;

/// URL-safe decoder that tolerates `=` padding and non-zero trailing bits.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// The three text segments of a token, borrowed from the presented string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSegments<'a> {
    pub header: &'a str,
    pub payload: &'a str,
    pub signature: &'a str,
}

impl TokenSegments<'_> {
    /// The exact string the signature covers: `header "." payload`.
    pub fn canonical(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }
}

/// A token whose header and payload parsed, not yet verified.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken<'a> {
    pub header: TokenHeader,
    pub claims: TokenClaims,
    pub segments: TokenSegments<'a>,
}

/// Serialize a segment to JSON, then to unpadded base64url.
pub fn encode_segment<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|_| TokenError::MalformedToken)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Reverse of [`encode_segment`].
///
/// Standard-alphabet input (`+`, `/`, padding) is accepted as well, since
/// some encoders in the field never converted to the URL-safe form.
pub fn decode_segment<T: DeserializeOwned>(text: &str) -> Result<T, TokenError> {
    let bytes = decode_base64url(text).ok_or(TokenError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::MalformedToken)
}

/// Split a token on its two `.` separators.
pub fn split(token: &str) -> Result<TokenSegments<'_>, TokenError> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok(TokenSegments {
            header,
            payload,
            signature,
        }),
        _ => Err(TokenError::MalformedToken),
    }
}

/// Split and parse header and payload. The signature stays as text.
pub fn decode(token: &str) -> Result<DecodedToken<'_>, TokenError> {
    let segments = split(token)?;
    decode_segments(segments)
}

pub(crate) fn decode_segments(segments: TokenSegments<'_>) -> Result<DecodedToken<'_>, TokenError> {
    let header = decode_segment(segments.header)?;
    let claims = decode_segment(segments.payload)?;
    Ok(DecodedToken {
        header,
        claims,
        segments,
    })
}

/// Encode raw signature bytes for the third segment.
pub fn encode_signature(signature: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(signature)
}

/// Decode the third segment. `None` when it is not base64 at all.
pub fn decode_signature(text: &str) -> Option<Vec<u8>> {
    decode_base64url(text)
}

fn decode_base64url(text: &str) -> Option<Vec<u8>> {
    let normalized: String = text
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_LENIENT.decode(normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::roles::Role;
    use serde_json::json;

    fn sample_claims() -> TokenClaims {
        TokenClaims {
            sub: "7".to_string(),
            role: Role::Resident,
            name: "Jane Doe".to_string(),
            bld: "C".to_string(),
            unit: "101".to_string(),
            ic: 1,
            iss: "J.Smith-3".to_string(),
        }
    }

    #[test]
    fn encode_segment_is_unpadded_url_safe() {
        let text = encode_segment(&json!({"a": "??>>"})).unwrap();
        assert!(!text.contains('='));
        assert!(!text.contains('+'));
        assert!(!text.contains('/'));
    }

    #[test]
    fn header_encodes_to_the_well_known_prefix() {
        let text = encode_segment(&TokenHeader::es256()).unwrap();
        assert_eq!(text, "eyJhbGciOiJFUzI1NiIsInR5cCI6IkpXVCJ9");
    }

    #[test]
    fn decode_segment_accepts_padding_and_standard_alphabet() {
        // {"k":"~~~?"} encodes with '+' and '/' in the standard alphabet
        let standard = "eyJrIjoifn5+PyJ9";
        let value: serde_json::Value = decode_segment(standard).unwrap();
        assert_eq!(value["k"], "~~~?");

        let padded = "eyJrIjoxfQ==";
        let value: serde_json::Value = decode_segment(padded).unwrap();
        assert_eq!(value["k"], 1);
    }

    #[test]
    fn decode_segment_rejects_non_json() {
        let text = URL_SAFE_NO_PAD.encode(b"not json");
        assert_eq!(
            decode_segment::<serde_json::Value>(&text),
            Err(TokenError::MalformedToken)
        );
        assert_eq!(
            decode_segment::<serde_json::Value>("%%%"),
            Err(TokenError::MalformedToken)
        );
    }

    #[test]
    fn split_requires_exactly_three_segments() {
        assert_eq!(split("not-a-jwt"), Err(TokenError::MalformedToken));
        assert_eq!(split("a.b"), Err(TokenError::MalformedToken));
        assert_eq!(split("a.b.c.d"), Err(TokenError::MalformedToken));

        let segments = split("a.b.c").unwrap();
        assert_eq!(segments.header, "a");
        assert_eq!(segments.payload, "b");
        assert_eq!(segments.signature, "c");
        assert_eq!(segments.canonical(), "a.b");
    }

    #[test]
    fn decode_parses_header_and_claims() {
        let token = format!(
            "{}.{}.sig",
            encode_segment(&TokenHeader::es256()).unwrap(),
            encode_segment(&sample_claims()).unwrap()
        );
        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.header, TokenHeader::es256());
        assert_eq!(decoded.claims, sample_claims());
        assert_eq!(decoded.segments.signature, "sig");
    }

    #[test]
    fn decode_keeps_original_segment_text() {
        // Non-compact JSON must survive untouched in the segment text.
        let payload = URL_SAFE_NO_PAD.encode(
            br#"{"sub": "7", "role": "res", "name": "Jane Doe", "bld": "C", "unit": "101", "iss": "x"}"#,
        );
        let header = encode_segment(&TokenHeader::es256()).unwrap();
        let token = format!("{header}.{payload}.sig");

        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.segments.payload, payload);
        assert_eq!(decoded.claims.ic, 1);
    }

    #[test]
    fn decode_classifies_bad_payload_as_malformed() {
        let header = encode_segment(&TokenHeader::es256()).unwrap();
        let token = format!("{header}.!!!.sig");
        assert_eq!(decode(&token), Err(TokenError::MalformedToken));

        let missing_fields = encode_segment(&json!({"role": "res"})).unwrap();
        let token = format!("{header}.{missing_fields}.sig");
        assert_eq!(decode(&token), Err(TokenError::MalformedToken));
    }

    #[test]
    fn signature_text_round_trips_bytes() {
        let bytes = [0xfbu8, 0xff, 0x00, 0x10];
        let text = encode_signature(&bytes);
        assert_eq!(decode_signature(&text).unwrap(), bytes);
        assert!(decode_signature("***").is_none());
    }
}
