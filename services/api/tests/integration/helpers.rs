use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use wishlist_api::domain::repository::{
    FileStore, Mailer, ProfileCache, SocialVerifier, TokenRepository, UserRepository,
    WishRepository,
};
use wishlist_api::domain::types::{
    Mail, MailSettings, ProfileChanges, Profiles, PublicProfile, Reservation, Social,
    SocialIdentity, SocialLink, SocialProvider, Style, StyleSlot, User, Wish, WishContent,
};
use wishlist_api::error::ApiError;
use wishlist_api::usecase::token::TokenService;
use wishlist_domain::access::TokenPurpose;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    fn with_user(&self, id: Uuid, f: impl FnOnce(&mut User)) {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            f(u);
            u.updated_at = Utc::now();
        }
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username.as_deref() == Some(username))
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<(), ApiError> {
        let changes = changes.clone();
        self.with_user(id, |u| {
            if let Some(email) = changes.email {
                u.email = email;
            }
            if let Some(hash) = changes.password_hash {
                u.password_hash = Some(hash);
            }
            if let Some(name) = changes.name {
                u.name = name;
            }
            if let Some(username) = changes.username {
                u.username = Some(username);
            }
            if let Some(description) = changes.description {
                u.description = Some(description);
            }
            if let Some(profiles) = changes.profiles {
                u.profiles = profiles;
            }
        });
        Ok(())
    }

    async fn set_style(&self, id: Uuid, slot: StyleSlot, path: &str) -> Result<(), ApiError> {
        self.with_user(id, |u| match slot {
            StyleSlot::Avatar => u.style.avatar = Some(path.to_owned()),
            StyleSlot::Background => u.style.background = Some(path.to_owned()),
        });
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), ApiError> {
        self.with_user(id, |u| u.verified = true);
        Ok(())
    }

    async fn link_social(&self, id: Uuid, link: &SocialLink) -> Result<(), ApiError> {
        let link = link.clone();
        self.with_user(id, |u| {
            match link.provider {
                SocialProvider::Google => u.social.google = Some(link.external_id),
                SocialProvider::Facebook => u.social.facebook = Some(link.external_id),
            }
            u.verified = link.verified;
            if let Some(name) = link.name {
                u.name = name;
            }
        });
        Ok(())
    }
}

// ── MockTokenRepo ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockTokenRepo {
    pub rows: Arc<Mutex<Vec<(Uuid, TokenPurpose, String)>>>,
}

impl MockTokenRepo {
    pub fn count(&self, user_id: Uuid, purpose: TokenPurpose) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, p, _)| *u == user_id && *p == purpose)
            .count()
    }

    /// Most recently issued token of `purpose` for `user_id`.
    pub fn latest(&self, user_id: Uuid, purpose: TokenPurpose) -> Option<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(u, p, _)| *u == user_id && *p == purpose)
            .map(|(_, _, t)| t.clone())
    }
}

impl TokenRepository for MockTokenRepo {
    async fn insert(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<(), ApiError> {
        self.rows
            .lock()
            .unwrap()
            .push((user_id, purpose, token.to_owned()));
        Ok(())
    }

    async fn exists(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<bool, ApiError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|(u, p, t)| *u == user_id && *p == purpose && t == token))
    }

    async fn delete(&self, user_id: Uuid, token: &str) -> Result<bool, ApiError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(u, _, t)| !(*u == user_id && t == token));
        Ok(rows.len() != before)
    }
}

// ── MockWishRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockWishRepo {
    pub wishes: Arc<Mutex<Vec<Wish>>>,
}

impl MockWishRepo {
    /// Raw stored row, including soft-deleted wishes.
    pub fn stored(&self, id: Uuid) -> Option<Wish> {
        self.wishes
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.id == id)
            .cloned()
    }

    fn with_wish(&self, id: Uuid, f: impl FnOnce(&mut Wish)) {
        let mut wishes = self.wishes.lock().unwrap();
        if let Some(w) = wishes.iter_mut().find(|w| w.id == id) {
            f(w);
        }
    }

    fn list(&self, keep: impl Fn(&Wish) -> bool) -> Vec<Wish> {
        let mut found: Vec<Wish> = self
            .wishes
            .lock()
            .unwrap()
            .iter()
            .filter(|w| !w.deleted && keep(w))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        found
    }
}

impl WishRepository for MockWishRepo {
    async fn create(&self, wish: &Wish) -> Result<(), ApiError> {
        self.wishes.lock().unwrap().push(wish.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Wish>, ApiError> {
        Ok(self.stored(id).filter(|w| !w.deleted))
    }

    async fn list_by_creator(&self, creator_id: Uuid) -> Result<Vec<Wish>, ApiError> {
        Ok(self.list(|w| w.creator_id == creator_id))
    }

    async fn list_reserved_by(&self, user_id: Uuid) -> Result<Vec<Wish>, ApiError> {
        Ok(self.list(|w| w.reserved_by == Some(user_id)))
    }

    async fn update_content(&self, id: Uuid, content: &WishContent) -> Result<(), ApiError> {
        self.with_wish(id, |w| content.apply_to(w));
        Ok(())
    }

    async fn complete(&self, id: Uuid, reason: Option<&str>) -> Result<(), ApiError> {
        self.with_wish(id, |w| {
            w.completed = true;
            w.completed_reason = reason.map(str::to_owned);
        });
        Ok(())
    }

    async fn uncomplete(&self, id: Uuid) -> Result<(), ApiError> {
        self.with_wish(id, |w| {
            w.completed = false;
            w.completed_reason = None;
        });
        Ok(())
    }

    async fn reserve(&self, id: Uuid, reservation: &Reservation) -> Result<(), ApiError> {
        self.with_wish(id, |w| {
            w.reserved = true;
            w.reserved_by = Some(reservation.by);
            w.reserved_by_name = reservation.name.clone();
        });
        Ok(())
    }

    async fn unreserve(&self, id: Uuid) -> Result<(), ApiError> {
        self.with_wish(id, |w| {
            w.reserved = false;
            w.reserved_by = None;
            w.reserved_by_name = None;
        });
        Ok(())
    }

    async fn mark_deleted(&self, id: Uuid) -> Result<(), ApiError> {
        self.with_wish(id, |w| w.deleted = true);
        Ok(())
    }
}

// ── MockProfileCache ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockProfileCache {
    pub entries: Arc<Mutex<HashMap<String, PublicProfile>>>,
    pub invalidated: Arc<Mutex<Vec<String>>>,
}

impl ProfileCache for MockProfileCache {
    async fn get(&self, username: &str) -> Result<Option<PublicProfile>, ApiError> {
        Ok(self.entries.lock().unwrap().get(username).cloned())
    }

    async fn put(&self, username: &str, profile: &PublicProfile) -> Result<(), ApiError> {
        self.entries
            .lock()
            .unwrap()
            .insert(username.to_owned(), profile.clone());
        Ok(())
    }

    async fn invalidate(&self, username: &str) -> Result<(), ApiError> {
        self.entries.lock().unwrap().remove(username);
        self.invalidated.lock().unwrap().push(username.to_owned());
        Ok(())
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<Mail>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl Mailer for MockMailer {
    async fn send(&self, mail: &Mail) -> Result<(), ApiError> {
        if self.fail {
            return Err(ApiError::Upstream(anyhow::anyhow!("smtp unavailable")));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

// ── MockSocialVerifier ───────────────────────────────────────────────────────

/// Accepts exactly one credential and answers with a fixed identity.
pub struct MockSocialVerifier {
    pub credential: String,
    pub identity: SocialIdentity,
}

impl SocialVerifier for MockSocialVerifier {
    async fn verify(
        &self,
        provider: SocialProvider,
        credential: &str,
    ) -> Result<SocialIdentity, ApiError> {
        if credential != self.credential || provider != self.identity.provider {
            return Err(ApiError::InvalidToken);
        }
        Ok(self.identity.clone())
    }
}

// ── MockFileStore ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockFileStore {
    pub saved: Arc<Mutex<Vec<(String, usize)>>>,
}

impl FileStore for MockFileStore {
    async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, ApiError> {
        let ext = original_name
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_owned());
        let name = format!("{}.{ext}", Uuid::new_v4().simple());
        self.saved.lock().unwrap().push((name.clone(), bytes.len()));
        Ok(name)
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_user(name: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        email: format!("{}@example.com", name.to_ascii_lowercase()),
        username: Some(name.to_ascii_lowercase()),
        password_hash: None,
        name: name.to_owned(),
        description: None,
        verified: false,
        profiles: Profiles::default(),
        social: Social::default(),
        style: Style::default(),
        created_at: now,
        updated_at: now,
    }
}

pub fn token_service(tokens: MockTokenRepo) -> TokenService<MockTokenRepo> {
    TokenService {
        tokens,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        auth_ttl_secs: 3600,
        email_verify_ttl_secs: 600,
    }
}

pub fn mail_settings() -> MailSettings {
    MailSettings {
        app_name: "Wishlist".to_owned(),
        public_url: "http://localhost:3000".to_owned(),
    }
}

pub fn test_wish(creator: &User, title: &str) -> Wish {
    Wish {
        id: Uuid::now_v7(),
        creator_id: creator.id,
        creator_name: creator.name.clone(),
        title: title.to_owned(),
        description: None,
        link: None,
        price: None,
        currency: None,
        deleted: false,
        completed: false,
        completed_reason: None,
        reserved: false,
        reserved_by: None,
        reserved_by_name: None,
        created_at: Utc::now(),
    }
}
