//! `X-Authorization` header helpers.
//!
//! Clients send the bearer token verbatim (no `Bearer ` prefix) and the
//! service returns a fresh token in the same header after login-like calls.

use http::{HeaderMap, HeaderName, HeaderValue};

/// Header carrying the bearer token on requests and responses.
pub const X_AUTHORIZATION: &str = "x-authorization";

/// Read the token from request headers. Empty or non-ASCII values count as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Header pair returning `token` to the client.
pub fn authorization_header(token: &str) -> Option<(HeaderName, HeaderValue)> {
    let value = HeaderValue::from_str(token).ok()?;
    Some((HeaderName::from_static(X_AUTHORIZATION), value))
}
