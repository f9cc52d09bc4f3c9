#![allow(async_fn_in_trait)]

use uuid::Uuid;

use wishlist_domain::access::TokenPurpose;

use crate::domain::types::{
    Mail, ProfileChanges, PublicProfile, Reservation, SocialIdentity, SocialLink,
    SocialProvider, StyleSlot, User, Wish, WishContent,
};
use crate::error::ApiError;

/// Account storage. Unique e-mail/username violations surface as
/// `DuplicateEmail`/`DuplicateUsername`.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
    async fn create(&self, user: &User) -> Result<(), ApiError>;
    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<(), ApiError>;
    async fn set_style(&self, id: Uuid, slot: StyleSlot, path: &str) -> Result<(), ApiError>;
    async fn mark_verified(&self, id: Uuid) -> Result<(), ApiError>;
    async fn link_social(&self, id: Uuid, link: &SocialLink) -> Result<(), ApiError>;
}

/// Issued tokens. Each method is a single statement so concurrent sessions
/// never overwrite each other's tokens.
pub trait TokenRepository: Send + Sync {
    async fn insert(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<(), ApiError>;

    async fn exists(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<bool, ApiError>;

    /// Returns `true` if a row was removed.
    async fn delete(&self, user_id: Uuid, token: &str) -> Result<bool, ApiError>;
}

/// Wish storage. Reads never return soft-deleted wishes.
pub trait WishRepository: Send + Sync {
    async fn create(&self, wish: &Wish) -> Result<(), ApiError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Wish>, ApiError>;
    /// Newest first.
    async fn list_by_creator(&self, creator_id: Uuid) -> Result<Vec<Wish>, ApiError>;
    /// Newest first.
    async fn list_reserved_by(&self, user_id: Uuid) -> Result<Vec<Wish>, ApiError>;
    async fn update_content(&self, id: Uuid, content: &WishContent) -> Result<(), ApiError>;
    async fn complete(&self, id: Uuid, reason: Option<&str>) -> Result<(), ApiError>;
    /// Clears `completed` together with the reason.
    async fn uncomplete(&self, id: Uuid) -> Result<(), ApiError>;
    async fn reserve(&self, id: Uuid, reservation: &Reservation) -> Result<(), ApiError>;
    /// Clears every reservation field.
    async fn unreserve(&self, id: Uuid) -> Result<(), ApiError>;
    async fn mark_deleted(&self, id: Uuid) -> Result<(), ApiError>;
}

/// Short-lived cache of public profiles keyed by username.
pub trait ProfileCache: Send + Sync {
    async fn get(&self, username: &str) -> Result<Option<PublicProfile>, ApiError>;
    async fn put(&self, username: &str, profile: &PublicProfile) -> Result<(), ApiError>;
    async fn invalidate(&self, username: &str) -> Result<(), ApiError>;
}

pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &Mail) -> Result<(), ApiError>;
}

/// Verifies a client-supplied provider credential with the provider itself.
pub trait SocialVerifier: Send + Sync {
    async fn verify(
        &self,
        provider: SocialProvider,
        credential: &str,
    ) -> Result<SocialIdentity, ApiError>;
}

/// Stores uploaded images and returns the generated file name.
pub trait FileStore: Send + Sync {
    async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, ApiError>;
}
