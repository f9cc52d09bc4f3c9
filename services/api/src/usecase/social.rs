use chrono::Utc;
use uuid::Uuid;

use wishlist_domain::access::TokenPurpose;
use wishlist_domain::validate::Violations;

use crate::domain::repository::{ProfileCache, SocialVerifier, TokenRepository, UserRepository};
use crate::domain::types::{
    Profiles, Social, SocialIdentity, SocialLink, SocialProvider, Style, User,
};
use crate::error::ApiError;
use crate::usecase::token::TokenService;
use crate::usecase::user::{Session, check_email, forget_profile};

/// Width of `users.name`; longer provider names are cut to fit.
const MAX_NAME_CHARS: usize = 120;

/// Log in with a provider credential, linking or creating the account by e-mail.
pub struct SocialLoginUseCase<
    U: UserRepository,
    T: TokenRepository,
    S: SocialVerifier,
    C: ProfileCache,
> {
    pub users: U,
    pub tokens: TokenService<T>,
    pub verifier: S,
    pub cache: C,
}

impl<U, T, S, C> SocialLoginUseCase<U, T, S, C>
where
    U: UserRepository,
    T: TokenRepository,
    S: SocialVerifier,
    C: ProfileCache,
{
    pub async fn execute(
        &self,
        provider: SocialProvider,
        credential: &str,
    ) -> Result<Session, ApiError> {
        if credential.trim().is_empty() {
            return Err(ApiError::invalid_field(
                credential_field(provider),
                "must not be empty",
            ));
        }
        let identity = self.verifier.verify(provider, credential).await?;
        let user = self.link_social_identity(identity).await?;
        let token = self.tokens.issue(user.id, TokenPurpose::Auth).await?;
        Ok(Session { user, token })
    }

    /// Existing account: record the provider id, upgrade `verified`, fill an
    /// empty name. The password is never touched. Otherwise a password-less
    /// account is created.
    pub async fn link_social_identity(&self, identity: SocialIdentity) -> Result<User, ApiError> {
        let email = identity
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                ApiError::invalid_field("email", "provider did not share an email address")
            })?
            .to_owned();
        let mut v = Violations::new();
        check_email(&mut v, &email);
        v.into_result()?;
        let name = identity
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| n.chars().take(MAX_NAME_CHARS).collect::<String>());

        let Some(user) = self.users.find_by_email(&email).await? else {
            return self.create_from_identity(email, name, identity).await;
        };

        let link = SocialLink {
            provider: identity.provider,
            external_id: identity.external_id,
            verified: user.verified || identity.email_verified,
            name: name.filter(|_| user.name.is_empty()),
        };
        self.users.link_social(user.id, &link).await?;
        forget_profile(&self.cache, user.username.as_deref()).await;
        tracing::info!(user_id = %user.id, provider = link.provider.as_str(), "social identity linked");

        self.users
            .find_by_id(user.id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }

    async fn create_from_identity(
        &self,
        email: String,
        name: Option<String>,
        identity: SocialIdentity,
    ) -> Result<User, ApiError> {
        let mut social = Social::default();
        match identity.provider {
            SocialProvider::Google => social.google = Some(identity.external_id),
            SocialProvider::Facebook => social.facebook = Some(identity.external_id),
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email,
            username: None,
            password_hash: None,
            name: name.unwrap_or_default(),
            description: None,
            verified: identity.email_verified,
            profiles: Profiles::default(),
            social,
            style: Style::default(),
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, provider = identity.provider.as_str(), "user created from social login");
        Ok(user)
    }
}

fn credential_field(provider: SocialProvider) -> &'static str {
    match provider {
        SocialProvider::Google => "token",
        SocialProvider::Facebook => "accessToken",
    }
}
