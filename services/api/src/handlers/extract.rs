use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use wishlist_auth_types::header::bearer_token;
use wishlist_domain::access::TokenPurpose;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::ApiError;
use crate::state::AppState;

/// JSON body whose rejections use the service error format.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Parse a JSON body that may be omitted entirely.
pub fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))
}

pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId)
}

/// Caller authenticated by a live `auth` token in `X-Authorization`.
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

/// Authenticated caller when a token is sent; guests get `None`.
/// A token that is sent but invalid is still rejected.
pub struct MaybeUser(pub Option<CurrentUser>);

async fn authenticate(state: &AppState, token: String) -> Result<CurrentUser, ApiError> {
    let subject = state
        .token_service()
        .verify_for(&token, TokenPurpose::Auth)
        .await
        .map_err(|e| match e {
            ApiError::TokenNotFound => ApiError::InvalidToken,
            other => other,
        })?;
    let user = state
        .user_repo()
        .find_by_id(subject.user_id)
        .await?
        .ok_or(ApiError::InvalidToken)?;
    Ok(CurrentUser { user, token })
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::InvalidToken)?;
        authenticate(state, token).await
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(&parts.headers) {
            Some(token) => Ok(Self(Some(authenticate(state, token).await?))),
            None => Ok(Self(None)),
        }
    }
}
