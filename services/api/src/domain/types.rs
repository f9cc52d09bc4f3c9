use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public links shown on a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profiles {
    pub facebook: Option<String>,
    pub twitter: Option<String>,
}

/// External account ids of linked social providers. Never serialized to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Social {
    pub google: Option<String>,
    pub facebook: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub avatar: Option<String>,
    pub background: Option<String>,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    /// `None` means the account has no local password (social-only).
    pub password_hash: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub verified: bool,
    pub profiles: Profiles,
    pub social: Social,
    pub style: Style,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            verified: self.verified,
            name: self.name.clone(),
            username: self.username.clone(),
            profiles: self.profiles.clone(),
            description: self.description.clone(),
            style: self.style.clone(),
        }
    }

    pub fn private_profile(&self) -> PrivateProfile {
        PrivateProfile {
            public: self.public_profile(),
            email: self.email.clone(),
        }
    }
}

/// What anyone may see about a user. Also the shape stored in the profile cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub verified: bool,
    pub name: String,
    pub username: Option<String>,
    pub profiles: Profiles,
    pub description: Option<String>,
    pub style: Style,
}

/// Public profile plus the fields only the owner sees.
#[derive(Debug, Clone, Serialize)]
pub struct PrivateProfile {
    #[serde(flatten)]
    pub public: PublicProfile,
    pub email: String,
}

/// Whitelisted profile changes. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub description: Option<String>,
    pub profiles: Option<Profiles>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password_hash.is_none()
            && self.name.is_none()
            && self.username.is_none()
            && self.description.is_none()
            && self.profiles.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleSlot {
    Avatar,
    Background,
}

impl StyleSlot {
    /// Multipart field carrying the image.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Background => "background",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialProvider {
    Google,
    Facebook,
}

impl SocialProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }
}

/// Identity attested by a social provider for a client-supplied credential.
#[derive(Debug, Clone)]
pub struct SocialIdentity {
    pub provider: SocialProvider,
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Whether the provider vouches for the e-mail address.
    pub email_verified: bool,
}

/// Update applied to an existing account when a social identity is linked to it.
#[derive(Debug, Clone)]
pub struct SocialLink {
    pub provider: SocialProvider,
    pub external_id: String,
    pub verified: bool,
    /// Filled only when the account has no name yet.
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Settings used to compose outgoing mails.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub app_name: String,
    pub public_url: String,
}

impl MailSettings {
    pub fn verification_url(&self, token: &str) -> String {
        format!(
            "{}/api/users/verify/{token}",
            self.public_url.trim_end_matches('/')
        )
    }

    pub fn verification_mail(&self, to: &str, token: &str) -> Mail {
        let homepage = format!("{}/", self.public_url.trim_end_matches('/'));
        Mail {
            to: to.to_owned(),
            subject: format!("{}: E-mail verification", self.app_name),
            body: format!(
                "Welcome to {app}!\n\n\
                 Please confirm your e-mail address by opening this link:\n{url}\n\n\
                 {app}: {homepage}\n",
                app = self.app_name,
                url = self.verification_url(token),
            ),
        }
    }
}

// ── Wishes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wish {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub deleted: bool,
    pub completed: bool,
    pub completed_reason: Option<String>,
    pub reserved: bool,
    pub reserved_by: Option<Uuid>,
    pub reserved_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Content edit of a wish. `None` fields keep their stored value; `price` and
/// `currency` are always written together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishContent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub pricing: Option<wishlist_domain::price::Pricing>,
}

impl WishContent {
    pub fn apply_to(&self, wish: &mut Wish) {
        if let Some(title) = &self.title {
            wish.title = title.clone();
        }
        if let Some(description) = &self.description {
            wish.description = Some(description.clone());
        }
        if let Some(link) = &self.link {
            wish.link = Some(link.clone());
        }
        if let Some(pricing) = &self.pricing {
            wish.price = pricing.price.clone();
            wish.currency = pricing.currency.clone();
        }
    }
}

/// Who holds a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub by: Uuid,
    pub name: Option<String>,
}
