// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ECDSA P-256 / SHA-256 over the canonical token string.
//!
//! Signatures are the fixed-size `r || s` form (64 bytes) used by JWS ES256,
//! not ASN.1 DER.

use p256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};

/// Sign `canonical` and return the raw signature bytes.
pub fn sign(key: &SigningKey, canonical: &str) -> Vec<u8> {
    let signature: Signature = key.sign(canonical.as_bytes());
    signature.to_bytes().to_vec()
}

/// Check `signature` over `canonical`.
///
/// A signature of the wrong length or with out-of-range scalars is simply
/// not valid; there is no separate error path.
pub fn verify(key: &VerifyingKey, canonical: &str, signature: &[u8]) -> bool {
    match Signature::from_slice(signature) {
        Ok(signature) => key.verify(canonical.as_bytes(), &signature).is_ok(),
        Err(_) => false,
    }
}
