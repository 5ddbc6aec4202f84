//! Webhook signature verification.
//!
//! The platform signs each callback as `base64(sha256(secret || payload))`
//! over the exact bytes it sends. Verification must therefore run on the
//! raw body, before any JSON parsing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::HeaderMap;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{NoxError, NoxResult};

/// Accepted signature headers, in priority order.
pub const SIGNATURE_HEADERS: [&str; 2] = ["X-Signature", "noxpay-sign"];

/// `base64(sha256(secret || payload))`
pub fn compute_signature(secret: &str, payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(payload);
    STANDARD.encode(hasher.finalize())
}

/// Constant-time check of `presented` against the expected signature.
pub fn verify(secret: &str, payload: &[u8], presented: &[u8]) -> bool {
    let expected = compute_signature(secret, payload);
    expected.as_bytes().ct_eq(presented).into()
}

/// Like [`verify`], but reports why verification failed.
///
/// Empty input is rejected with `MissingCredentials` before any hashing.
pub fn require_valid(secret: &str, payload: &[u8], presented: &[u8]) -> NoxResult<()> {
    if payload.is_empty() || presented.is_empty() {
        return Err(NoxError::MissingCredentials);
    }

    if !verify(secret, payload, presented) {
        return Err(NoxError::InvalidSignature);
    }

    Ok(())
}

/// First non-empty signature header, checked in [`SIGNATURE_HEADERS`] order.
///
/// Values are taken as raw bytes: a non-ASCII value is a wrong signature,
/// not a missing one.
pub fn select_signature(headers: &HeaderMap) -> Option<&[u8]> {
    SIGNATURE_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .map(|v| v.as_bytes())
            .filter(|v| !v.is_empty())
    })
}
