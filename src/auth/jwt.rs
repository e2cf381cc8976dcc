//! Unverified reads of access-token claims
//!
//! The identity provider remains the authority on token validity; these
//! helpers only look at `exp` to decide whether a refresh is due before
//! asking the provider about the user.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Read the `exp` claim of a JWT without verifying its signature.
///
/// Returns `None` for malformed tokens or tokens without an `exp` claim.
pub fn access_token_expiry(token: &str) -> Option<i64> {
    // JWT format: header.payload.signature
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice::<ExpiryClaims>(&bytes).ok()?.exp
}
