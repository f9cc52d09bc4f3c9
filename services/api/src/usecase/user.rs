use anyhow::Context as _;
use chrono::Utc;
use uuid::Uuid;

use wishlist_domain::access::TokenPurpose;
use wishlist_domain::validate::{Violations, is_email, is_username};

use crate::domain::repository::{
    FileStore, Mailer, ProfileCache, TokenRepository, UserRepository,
};
use crate::domain::types::{
    MailSettings, ProfileChanges, Profiles, PublicProfile, Social, Style, StyleSlot, User,
};
use crate::error::ApiError;
use crate::usecase::token::TokenService;

/// Largest accepted avatar/background image.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// A user together with a freshly issued `auth` token.
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub async fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("join password hashing task")?
        .context("hash password")?;
    Ok(hash)
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("join password verification task")?
        .context("verify password")?;
    Ok(matches)
}

/// Blank strings count as "not provided".
fn provided(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub(crate) fn check_email(v: &mut Violations, email: &str) {
    v.length("email", email, 3, 120)
        .check("email", is_email(email), "must be a valid email");
}

fn check_username(v: &mut Violations, username: &str) {
    v.check(
        "username",
        is_username(username),
        "must be 3 to 120 letters, digits, '-', '_' or '.'",
    );
}

/// Drops the cached public profile. Cache failures never fail the request.
pub(crate) async fn forget_profile<C: ProfileCache>(cache: &C, username: Option<&str>) {
    if let Some(username) = username {
        if let Err(e) = cache.invalidate(username).await {
            tracing::warn!(error = %e, username, "profile cache invalidation failed");
        }
    }
}

/// Look up a user by e-mail and check the password.
///
/// Distinguishes `UserNotFound` from `WrongPassword`; callers facing clients
/// should collapse both. Accounts without a local password never match.
pub async fn find_by_credentials<U: UserRepository>(
    users: &U,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let user = users
        .find_by_email(email)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    let Some(hash) = user.password_hash.as_deref() else {
        return Err(ApiError::WrongPassword);
    };
    if !verify_password(password, hash).await? {
        return Err(ApiError::WrongPassword);
    }
    Ok(user)
}

/// Issue an `email_verify` token and mail the link. No-op for verified users.
///
/// Only token storage can fail the call; a mail delivery failure is logged.
pub async fn request_verification<T: TokenRepository, M: Mailer>(
    tokens: &TokenService<T>,
    mailer: &M,
    settings: &MailSettings,
    user: &User,
) -> Result<(), ApiError> {
    if user.verified {
        return Ok(());
    }
    let token = tokens.issue(user.id, TokenPurpose::EmailVerify).await?;
    let mail = settings.verification_mail(&user.email, &token);
    if let Err(e) = mailer.send(&mail).await {
        tracing::warn!(error = %e, user_id = %user.id, "verification mail not sent");
    }
    Ok(())
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub username: Option<String>,
}

pub struct RegisterUseCase<U: UserRepository, T: TokenRepository, M: Mailer> {
    pub users: U,
    pub tokens: TokenService<T>,
    pub mailer: M,
    pub mail: MailSettings,
    pub bcrypt_cost: u32,
}

impl<U: UserRepository, T: TokenRepository, M: Mailer> RegisterUseCase<U, T, M> {
    pub async fn execute(&self, input: RegisterInput) -> Result<Session, ApiError> {
        let email = input.email.trim().to_owned();
        let name = provided(input.name);
        let username = provided(input.username);

        let mut v = Violations::new();
        check_email(&mut v, &email);
        v.length("password", &input.password, 6, 128)
            .length_opt("name", name.as_deref(), 2, 120);
        if let Some(username) = &username {
            check_username(&mut v, username);
        }
        v.into_result()?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::DuplicateEmail);
        }
        if let Some(username) = &username {
            if self.users.find_by_username(username).await?.is_some() {
                return Err(ApiError::DuplicateUsername);
            }
        }

        let password_hash = hash_password(&input.password, self.bcrypt_cost).await?;
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email,
            username,
            password_hash: Some(password_hash),
            name: name.unwrap_or_default(),
            description: None,
            verified: false,
            profiles: Profiles::default(),
            social: Social::default(),
            style: Style::default(),
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");

        request_verification(&self.tokens, &self.mailer, &self.mail, &user).await?;
        let token = self.tokens.issue(user.id, TokenPurpose::Auth).await?;
        Ok(Session { user, token })
    }
}

// ── Login / Logout ───────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<U: UserRepository, T: TokenRepository> {
    pub users: U,
    pub tokens: TokenService<T>,
}

impl<U: UserRepository, T: TokenRepository> LoginUseCase<U, T> {
    pub async fn execute(&self, input: LoginInput) -> Result<Session, ApiError> {
        let email = input.email.trim();
        let mut v = Violations::new();
        check_email(&mut v, email);
        v.length("password", &input.password, 6, 128);
        v.into_result()?;

        let user = find_by_credentials(&self.users, email, &input.password)
            .await
            .map_err(|e| match e {
                ApiError::UserNotFound | ApiError::WrongPassword => ApiError::InvalidCredentials,
                other => other,
            })?;
        let token = self.tokens.issue(user.id, TokenPurpose::Auth).await?;
        Ok(Session { user, token })
    }
}

pub struct LogoutUseCase<T: TokenRepository> {
    pub tokens: TokenService<T>,
}

impl<T: TokenRepository> LogoutUseCase<T> {
    pub async fn execute(&self, user_id: Uuid, token: &str) -> Result<(), ApiError> {
        self.tokens.revoke(user_id, token).await
    }
}

// ── Profiles ─────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, id: Uuid) -> Result<User, ApiError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

/// Public profile lookup by username, served from the cache when possible.
pub struct GetProfileByUsernameUseCase<U: UserRepository, C: ProfileCache> {
    pub users: U,
    pub cache: C,
}

impl<U: UserRepository, C: ProfileCache> GetProfileByUsernameUseCase<U, C> {
    pub async fn execute(&self, username: &str) -> Result<PublicProfile, ApiError> {
        if !is_username(username) {
            return Err(ApiError::invalid_field("username", "invalid username"));
        }
        match self.cache.get(username).await {
            Ok(Some(profile)) => return Ok(profile),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, username, "profile cache read failed"),
        }
        let profile = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(ApiError::UserNotFound)?
            .public_profile();
        if let Err(e) = self.cache.put(username, &profile).await {
            tracing::warn!(error = %e, username, "profile cache write failed");
        }
        Ok(profile)
    }
}

#[derive(Default)]
pub struct UpdateProfileInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub description: Option<String>,
    pub profiles: Option<Profiles>,
}

pub struct UpdateProfileUseCase<U: UserRepository, C: ProfileCache> {
    pub users: U,
    pub cache: C,
    pub bcrypt_cost: u32,
}

impl<U: UserRepository, C: ProfileCache> UpdateProfileUseCase<U, C> {
    pub async fn execute(
        &self,
        actor: &User,
        target: Uuid,
        input: UpdateProfileInput,
    ) -> Result<User, ApiError> {
        if actor.id != target {
            return Err(ApiError::Forbidden);
        }

        let email = provided(input.email);
        let password = input.password.filter(|p| !p.is_empty());
        let name = provided(input.name);
        let username = provided(input.username);
        let description = provided(input.description);
        let profiles = input.profiles.map(|p| Profiles {
            facebook: provided(p.facebook),
            twitter: provided(p.twitter),
        });

        let mut v = Violations::new();
        if let Some(email) = &email {
            check_email(&mut v, email);
        }
        v.length_opt("password", password.as_deref(), 6, 128)
            .length_opt("name", name.as_deref(), 2, 120)
            .length_opt("description", description.as_deref(), 3, 240);
        if let Some(username) = &username {
            check_username(&mut v, username);
        }
        v.into_result()?;

        if let Some(email) = &email {
            if email != &actor.email && self.users.find_by_email(email).await?.is_some() {
                return Err(ApiError::DuplicateEmail);
            }
        }
        if let Some(username) = &username {
            if Some(username) != actor.username.as_ref()
                && self.users.find_by_username(username).await?.is_some()
            {
                return Err(ApiError::DuplicateUsername);
            }
        }

        let password_hash = match password {
            Some(p) => Some(hash_password(&p, self.bcrypt_cost).await?),
            None => None,
        };
        let changes = ProfileChanges {
            email,
            password_hash,
            name,
            username,
            description,
            profiles,
        };
        if changes.is_empty() {
            return Err(ApiError::MissingData);
        }

        self.users.update_profile(target, &changes).await?;
        forget_profile(&self.cache, actor.username.as_deref()).await;
        forget_profile(&self.cache, changes.username.as_deref()).await;

        self.users
            .find_by_id(target)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Stores an avatar or background image and points the profile at it.
pub struct UpdateStyleUseCase<U: UserRepository, F: FileStore, C: ProfileCache> {
    pub users: U,
    pub files: F,
    pub cache: C,
    /// Public URL prefix of stored files, e.g. `/uploads`.
    pub uploads_prefix: String,
}

impl<U: UserRepository, F: FileStore, C: ProfileCache> UpdateStyleUseCase<U, F, C> {
    pub async fn execute(
        &self,
        actor: &User,
        target: Uuid,
        slot: StyleSlot,
        upload: Upload,
    ) -> Result<User, ApiError> {
        if actor.id != target {
            return Err(ApiError::Forbidden);
        }
        if upload.bytes.is_empty() {
            return Err(ApiError::MissingData);
        }
        if upload.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::PayloadTooLarge);
        }
        let file_name = self
            .files
            .save(upload.file_name.as_deref(), &upload.bytes)
            .await?;
        let path = format!("{}/{file_name}", self.uploads_prefix.trim_end_matches('/'));
        self.users.set_style(target, slot, &path).await?;
        forget_profile(&self.cache, actor.username.as_deref()).await;

        self.users
            .find_by_id(target)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── E-mail verification ──────────────────────────────────────────────────────

pub struct RequestVerificationUseCase<T: TokenRepository, M: Mailer> {
    pub tokens: TokenService<T>,
    pub mailer: M,
    pub mail: MailSettings,
}

impl<T: TokenRepository, M: Mailer> RequestVerificationUseCase<T, M> {
    pub async fn execute(&self, user: &User) -> Result<(), ApiError> {
        request_verification(&self.tokens, &self.mailer, &self.mail, user).await
    }
}

/// Consumes an `email_verify` token. A second use fails with `TokenNotFound`.
pub struct VerifyEmailUseCase<U: UserRepository, T: TokenRepository, C: ProfileCache> {
    pub users: U,
    pub tokens: TokenService<T>,
    pub cache: C,
}

impl<U: UserRepository, T: TokenRepository, C: ProfileCache> VerifyEmailUseCase<U, T, C> {
    pub async fn execute(&self, token: &str) -> Result<(), ApiError> {
        let subject = self
            .tokens
            .consume(token, TokenPurpose::EmailVerify)
            .await?;
        let Some(user) = self.users.find_by_id(subject.user_id).await? else {
            return Err(ApiError::UserNotFound);
        };
        self.users.mark_verified(user.id).await?;
        forget_profile(&self.cache, user.username.as_deref()).await;
        tracing::info!(user_id = %user.id, "email verified");
        Ok(())
    }
}
