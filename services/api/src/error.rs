use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use wishlist_domain::price::PriceError;
use wishlist_domain::validate::FieldError;

/// API error variants. Every handler returns `Result<_, ApiError>`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("nothing to update")]
    MissingData,
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("invalid id")]
    InvalidId,
    #[error("user not found")]
    UserNotFound,
    #[error("wish not found")]
    WishNotFound,
    #[error("token not found")]
    TokenNotFound,
    #[error("wrong password")]
    WrongPassword,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("no access")]
    Forbidden,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("username already taken")]
    DuplicateUsername,
    #[error("file too large")]
    PayloadTooLarge,
    #[error("upstream service error")]
    Upstream(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::MissingData => "MISSING_DATA",
            Self::MalformedBody(_) => "MALFORMED_BODY",
            Self::InvalidId => "INVALID_ID",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::WishNotFound => "WISH_NOT_FOUND",
            Self::TokenNotFound => "TOKEN_NOT_FOUND",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Forbidden => "FORBIDDEN",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::DuplicateUsername => "DUPLICATE_USERNAME",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::Upstream(_) => "UPSTREAM",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidId => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MissingData | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::UserNotFound | Self::WishNotFound | Self::TokenNotFound => StatusCode::NOT_FOUND,
            Self::WrongPassword | Self::InvalidCredentials | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::DuplicateEmail | Self::DuplicateUsername => StatusCode::CONFLICT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Single-field validation failure.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError {
            field: field.to_owned(),
            message: message.into(),
        }])
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }
}

impl From<PriceError> for ApiError {
    fn from(err: PriceError) -> Self {
        Self::invalid_field(err.field(), err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer records every request; only server-side failures need their cause logged.
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, kind = "INTERNAL", "internal error"),
            Self::Upstream(e) => tracing::warn!(error = ?e, kind = "UPSTREAM", "upstream error"),
            _ => {}
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::Validation(errors) = &self {
            body["errors"] = serde_json::json!(errors);
        }
        (status, axum::Json(body)).into_response()
    }
}
