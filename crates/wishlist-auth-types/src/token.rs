//! Purpose-scoped JWT signing and validation.
//!
//! Signing alone never authenticates a request: the service also checks that
//! the exact token string is still stored for the user. This module only
//! covers the cryptographic half.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wishlist_domain::access::TokenPurpose;

/// Errors returned by [`sign_token`] and [`decode_token`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload.
///
/// | Field | Meaning |
/// |-------|---------|
/// | `sub` | user ID (UUID string) |
/// | `access` | [`TokenPurpose`] wire value |
/// | `jti` | random ID so two tokens minted in the same second differ |
/// | `exp` | expiration, seconds since UNIX epoch |
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub access: TokenPurpose,
    pub jti: String,
    pub exp: u64,
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub exp: u64,
}

/// Identity carried by a token whose signature and expiry were checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub purpose: TokenPurpose,
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign an HS256 token for `user_id` valid for `ttl_secs`.
pub fn sign_token(
    user_id: Uuid,
    purpose: TokenPurpose,
    ttl_secs: u64,
    secret: &str,
) -> Result<SignedToken, TokenError> {
    let exp = now_secs() + ttl_secs;
    let claims = Claims {
        sub: user_id.to_string(),
        access: purpose,
        jti: Uuid::new_v4().to_string(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Signing)?;
    Ok(SignedToken { token, exp })
}

/// Decode and validate a token.
///
/// Validation: HS256, `exp` checked with the library's default 60s leeway,
/// required claims `exp` + `sub`.
pub fn decode_token(token: &str, secret: &str) -> Result<TokenSubject, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    let user_id = data
        .claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;

    Ok(TokenSubject {
        user_id,
        purpose: data.claims.access,
    })
}
