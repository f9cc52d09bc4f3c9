use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use wishlist_auth_types::header::authorization_header;

use crate::domain::types::{PrivateProfile, Profiles, PublicProfile, SocialProvider, StyleSlot};
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, CurrentUser, MaybeUser, parse_id};
use crate::state::AppState;
use crate::usecase::social::SocialLoginUseCase;
use crate::usecase::user::{
    GetProfileByUsernameUseCase, GetUserUseCase, LoginInput, LoginUseCase, LogoutUseCase,
    RegisterInput, RegisterUseCase, RequestVerificationUseCase, Session, UpdateProfileInput,
    UpdateProfileUseCase, UpdateStyleUseCase, Upload, VerifyEmailUseCase,
};

/// Private profile with the session token in `X-Authorization`.
fn session_response(status: StatusCode, session: Session) -> Result<Response, ApiError> {
    let (name, value) = authorization_header(&session.token)
        .ok_or_else(|| anyhow::anyhow!("token is not a valid header value"))?;
    let mut headers = HeaderMap::new();
    headers.insert(name, value);
    Ok((status, headers, Json(session.user.private_profile())).into_response())
}

// ── POST /api/users ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: Option<String>,
    pub username: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Response, ApiError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        tokens: state.token_service(),
        mailer: state.mailer.clone(),
        mail: state.mail_settings(),
        bcrypt_cost: state.config.bcrypt_cost,
    };
    let session = usecase
        .execute(RegisterInput {
            email: body.email,
            password: body.password,
            name: body.name,
            username: body.username,
        })
        .await?;
    session_response(StatusCode::CREATED, session)
}

// ── POST /api/users/login ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        tokens: state.token_service(),
    };
    let session = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    session_response(StatusCode::OK, session)
}

// ── POST /api/users/logout ───────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<StatusCode, ApiError> {
    let usecase = LogoutUseCase {
        tokens: state.token_service(),
    };
    usecase.execute(current.user.id, &current.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /api/users/google, /api/users/facebook ──────────────────────────────

#[derive(Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Deserialize)]
pub struct FacebookLoginRequest {
    #[serde(default, rename = "accessToken")]
    pub access_token: String,
}

async fn social_login(
    state: AppState,
    provider: SocialProvider,
    credential: &str,
) -> Result<Response, ApiError> {
    let usecase = SocialLoginUseCase {
        users: state.user_repo(),
        tokens: state.token_service(),
        verifier: state.social.clone(),
        cache: state.cache.clone(),
    };
    let session = usecase.execute(provider, credential).await?;
    session_response(StatusCode::OK, session)
}

pub async fn google_login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GoogleLoginRequest>,
) -> Result<Response, ApiError> {
    social_login(state, SocialProvider::Google, &body.token).await
}

pub async fn facebook_login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<FacebookLoginRequest>,
) -> Result<Response, ApiError> {
    social_login(state, SocialProvider::Facebook, &body.access_token).await
}

// ── POST /api/users/me/verify ────────────────────────────────────────────────

pub async fn request_verification(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<StatusCode, ApiError> {
    let usecase = RequestVerificationUseCase {
        tokens: state.token_service(),
        mailer: state.mailer.clone(),
        mail: state.mail_settings(),
    };
    usecase.execute(&current.user).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /api/users/verify/{token} ────────────────────────────────────────────

pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let usecase = VerifyEmailUseCase {
        users: state.user_repo(),
        tokens: state.token_service(),
        cache: state.cache.clone(),
    };
    usecase.execute(&token).await?;
    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, state.config.client_url.clone())],
    )
        .into_response())
}

// ── GET /api/users/{id}, GET /api/users/username/{username} ──────────────────

/// Owners see their private profile, everyone else the public one.
#[derive(Serialize)]
#[serde(untagged)]
pub enum ProfileResponse {
    Private(PrivateProfile),
    Public(PublicProfile),
}

pub async fn get_user(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let id = parse_id(&id)?;
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(id).await?;
    let is_owner = caller.is_some_and(|c| c.user.id == user.id);
    Ok(Json(if is_owner {
        ProfileResponse::Private(user.private_profile())
    } else {
        ProfileResponse::Public(user.public_profile())
    }))
}

pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicProfile>, ApiError> {
    let usecase = GetProfileByUsernameUseCase {
        users: state.user_repo(),
        cache: state.cache.clone(),
    };
    Ok(Json(usecase.execute(&username).await?))
}

// ── PATCH /api/users/{id} ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub description: Option<String>,
    pub profiles: Option<Profiles>,
}

pub async fn update_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> Result<Json<PrivateProfile>, ApiError> {
    let id = parse_id(&id)?;
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
        cache: state.cache.clone(),
        bcrypt_cost: state.config.bcrypt_cost,
    };
    let user = usecase
        .execute(
            &current.user,
            id,
            UpdateProfileInput {
                email: body.email,
                password: body.password,
                name: body.name,
                username: body.username,
                description: body.description,
                profiles: body.profiles,
            },
        )
        .await?;
    Ok(Json(user.private_profile()))
}

// ── POST /api/users/{id}/avatar, /api/users/{id}/background ──────────────────

fn multipart_err(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::MalformedBody(e.body_text())
    }
}

/// First multipart field named after `slot`.
async fn read_image(mut multipart: Multipart, slot: StyleSlot) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        if field.name() != Some(slot.field_name()) {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await.map_err(multipart_err)?;
        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::MissingData)
}

async fn update_style(
    state: AppState,
    current: CurrentUser,
    id: String,
    slot: StyleSlot,
    multipart: Multipart,
) -> Result<Json<PrivateProfile>, ApiError> {
    let id = parse_id(&id)?;
    if current.user.id != id {
        return Err(ApiError::Forbidden);
    }
    let upload = read_image(multipart, slot).await?;
    let usecase = UpdateStyleUseCase {
        users: state.user_repo(),
        files: state.file_store(),
        cache: state.cache.clone(),
        uploads_prefix: state.config.uploads_prefix(),
    };
    let user = usecase.execute(&current.user, id, slot, upload).await?;
    Ok(Json(user.private_profile()))
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<PrivateProfile>, ApiError> {
    update_style(state, current, id, StyleSlot::Avatar, multipart).await
}

pub async fn upload_background(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<PrivateProfile>, ApiError> {
    update_style(state, current, id, StyleSlot::Background, multipart).await
}
