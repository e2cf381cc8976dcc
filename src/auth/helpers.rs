//! Pure helper functions for authentication
//!
//! This module contains stateless helpers for reading auth parameters out of
//! the page URL, cleaning them up afterwards, and building HTTP clients.

use std::time::Duration;

use url::Url;

/// Query parameters carrying a one-time token
pub const QUERY_AUTH_PARAMS: &[&str] = &["token", "type"];

/// Fragment parameters carrying a session (implicit-grant style redirect)
pub const FRAGMENT_AUTH_PARAMS: &[&str] = &[
    "access_token",
    "refresh_token",
    "expires_in",
    "expires_at",
    "token_type",
    "type",
];

// =============================================================================
// URL Helpers
// =============================================================================

/// First non-empty value of `key` in a form-encoded string
pub fn form_value(encoded: &str, key: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded.as_bytes())
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

fn without_keys(encoded: &str, keys: &[&str]) -> Option<String> {
    let kept: Vec<(String, String)> = url::form_urlencoded::parse(encoded.as_bytes())
        .filter(|(k, _)| !keys.contains(&&**k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        return None;
    }

    Some(
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(kept)
            .finish(),
    )
}

/// Remove the one-time token parameters from the query, keeping everything else.
///
/// An empty query is dropped entirely.
pub fn strip_one_time_token_params(url: &Url) -> Url {
    let mut cleaned = url.clone();
    let query = url.query().and_then(|q| without_keys(q, QUERY_AUTH_PARAMS));
    cleaned.set_query(query.as_deref());
    cleaned
}

/// Remove the session parameters from the fragment, keeping everything else.
///
/// An empty fragment is dropped entirely.
pub fn strip_session_params(url: &Url) -> Url {
    let mut cleaned = url.clone();
    let fragment = url
        .fragment()
        .and_then(|f| without_keys(f, FRAGMENT_AUTH_PARAMS));
    cleaned.set_fragment(fragment.as_deref());
    cleaned
}

// =============================================================================
// HTTP Client Builders
// =============================================================================

/// Build a reqwest client with the configured timeouts
pub fn create_http_client(
    connect_timeout_secs: u64,
    request_timeout_secs: u64,
) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none()) // Security: prevent SSRF
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(request_timeout_secs))
        .build()
}

// =============================================================================
// Tests
// =============================================================================
