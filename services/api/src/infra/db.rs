use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
};
use uuid::Uuid;

use wishlist_api_schema::{user_tokens, users, wishes};
use wishlist_domain::access::TokenPurpose;

use crate::domain::repository::{TokenRepository, UserRepository, WishRepository};
use crate::domain::types::{
    ProfileChanges, Profiles, Reservation, Social, SocialLink, SocialProvider, Style, StyleSlot,
    User, Wish, WishContent,
};
use crate::error::ApiError;

/// Unique index violations on `users` become the matching duplicate error.
fn map_user_write_err(err: DbErr, action: &'static str) -> ApiError {
    if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
        if message.contains("username") {
            return ApiError::DuplicateUsername;
        }
        if message.contains("email") {
            return ApiError::DuplicateEmail;
        }
    }
    ApiError::Internal(anyhow::Error::new(err).context(action))
}

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            username: Set(user.username.clone()),
            password_hash: Set(user.password_hash.clone()),
            name: Set(user.name.clone()),
            description: Set(user.description.clone()),
            verified: Set(user.verified),
            profile_facebook: Set(user.profiles.facebook.clone()),
            profile_twitter: Set(user.profiles.twitter.clone()),
            social_google: Set(user.social.google.clone()),
            social_facebook: Set(user.social.facebook.clone()),
            style_avatar: Set(user.style.avatar.clone()),
            style_background: Set(user.style.background.clone()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_user_write_err(e, "create user"))?;
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<(), ApiError> {
        let mut model = users::ActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(email) = &changes.email {
            model.email = Set(email.clone());
        }
        if let Some(hash) = &changes.password_hash {
            model.password_hash = Set(Some(hash.clone()));
        }
        if let Some(name) = &changes.name {
            model.name = Set(name.clone());
        }
        if let Some(username) = &changes.username {
            model.username = Set(Some(username.clone()));
        }
        if let Some(description) = &changes.description {
            model.description = Set(Some(description.clone()));
        }
        if let Some(profiles) = &changes.profiles {
            model.profile_facebook = Set(profiles.facebook.clone());
            model.profile_twitter = Set(profiles.twitter.clone());
        }
        model
            .update(&self.db)
            .await
            .map_err(|e| map_user_write_err(e, "update user profile"))?;
        Ok(())
    }

    async fn set_style(&self, id: Uuid, slot: StyleSlot, path: &str) -> Result<(), ApiError> {
        let mut model = users::ActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        match slot {
            StyleSlot::Avatar => model.style_avatar = Set(Some(path.to_owned())),
            StyleSlot::Background => model.style_background = Set(Some(path.to_owned())),
        }
        model.update(&self.db).await.context("update user style")?;
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            verified: Set(true),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark user verified")?;
        Ok(())
    }

    async fn link_social(&self, id: Uuid, link: &SocialLink) -> Result<(), ApiError> {
        let mut model = users::ActiveModel {
            id: Set(id),
            verified: Set(link.verified),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        match link.provider {
            SocialProvider::Google => model.social_google = Set(Some(link.external_id.clone())),
            SocialProvider::Facebook => {
                model.social_facebook = Set(Some(link.external_id.clone()))
            }
        }
        if let Some(name) = &link.name {
            model.name = Set(name.clone());
        }
        model.update(&self.db).await.context("link social identity")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        password_hash: model.password_hash,
        name: model.name,
        description: model.description,
        verified: model.verified,
        profiles: Profiles {
            facebook: model.profile_facebook,
            twitter: model.profile_twitter,
        },
        social: Social {
            google: model.social_google,
            facebook: model.social_facebook,
        },
        style: Style {
            avatar: model.style_avatar,
            background: model.style_background,
        },
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Token repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTokenRepository {
    pub db: DatabaseConnection,
}

impl TokenRepository for DbTokenRepository {
    async fn insert(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<(), ApiError> {
        user_tokens::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            access: Set(purpose.as_str().to_owned()),
            token: Set(token.to_owned()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("insert user token")?;
        Ok(())
    }

    async fn exists(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<bool, ApiError> {
        let count = user_tokens::Entity::find()
            .filter(user_tokens::Column::UserId.eq(user_id))
            .filter(user_tokens::Column::Access.eq(purpose.as_str()))
            .filter(user_tokens::Column::Token.eq(token))
            .count(&self.db)
            .await
            .context("check user token")?;
        Ok(count > 0)
    }

    async fn delete(&self, user_id: Uuid, token: &str) -> Result<bool, ApiError> {
        let result = user_tokens::Entity::delete_many()
            .filter(user_tokens::Column::UserId.eq(user_id))
            .filter(user_tokens::Column::Token.eq(token))
            .exec(&self.db)
            .await
            .context("delete user token")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Wish repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbWishRepository {
    pub db: DatabaseConnection,
}

impl DbWishRepository {
    async fn list_where(
        &self,
        condition: impl sea_orm::sea_query::IntoCondition,
        action: &'static str,
    ) -> Result<Vec<Wish>, ApiError> {
        let models = wishes::Entity::find()
            .filter(condition)
            .filter(wishes::Column::Deleted.eq(false))
            .order_by_desc(wishes::Column::CreatedAt)
            .order_by_desc(wishes::Column::Id)
            .all(&self.db)
            .await
            .context(action)?;
        Ok(models.into_iter().map(wish_from_model).collect())
    }
}

impl WishRepository for DbWishRepository {
    async fn create(&self, wish: &Wish) -> Result<(), ApiError> {
        wishes::ActiveModel {
            id: Set(wish.id),
            creator_id: Set(wish.creator_id),
            creator_name: Set(wish.creator_name.clone()),
            title: Set(wish.title.clone()),
            description: Set(wish.description.clone()),
            link: Set(wish.link.clone()),
            price: Set(wish.price.clone()),
            currency: Set(wish.currency.clone()),
            deleted: Set(wish.deleted),
            completed: Set(wish.completed),
            completed_reason: Set(wish.completed_reason.clone()),
            reserved: Set(wish.reserved),
            reserved_by: Set(wish.reserved_by),
            reserved_by_name: Set(wish.reserved_by_name.clone()),
            created_at: Set(wish.created_at),
        }
        .insert(&self.db)
        .await
        .context("create wish")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Wish>, ApiError> {
        let model = wishes::Entity::find_by_id(id)
            .filter(wishes::Column::Deleted.eq(false))
            .one(&self.db)
            .await
            .context("find wish by id")?;
        Ok(model.map(wish_from_model))
    }

    async fn list_by_creator(&self, creator_id: Uuid) -> Result<Vec<Wish>, ApiError> {
        self.list_where(
            wishes::Column::CreatorId.eq(creator_id),
            "list wishes by creator",
        )
        .await
    }

    async fn list_reserved_by(&self, user_id: Uuid) -> Result<Vec<Wish>, ApiError> {
        self.list_where(
            wishes::Column::ReservedBy.eq(user_id),
            "list wishes reserved by user",
        )
        .await
    }

    async fn update_content(&self, id: Uuid, content: &WishContent) -> Result<(), ApiError> {
        let mut model = wishes::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(title) = &content.title {
            model.title = Set(title.clone());
        }
        if let Some(description) = &content.description {
            model.description = Set(Some(description.clone()));
        }
        if let Some(link) = &content.link {
            model.link = Set(Some(link.clone()));
        }
        if let Some(pricing) = &content.pricing {
            model.price = Set(pricing.price.clone());
            model.currency = Set(pricing.currency.clone());
        }
        model.update(&self.db).await.context("update wish content")?;
        Ok(())
    }

    async fn complete(&self, id: Uuid, reason: Option<&str>) -> Result<(), ApiError> {
        wishes::ActiveModel {
            id: Set(id),
            completed: Set(true),
            completed_reason: Set(reason.map(str::to_owned)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("complete wish")?;
        Ok(())
    }

    async fn uncomplete(&self, id: Uuid) -> Result<(), ApiError> {
        wishes::ActiveModel {
            id: Set(id),
            completed: Set(false),
            completed_reason: Set(None),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("uncomplete wish")?;
        Ok(())
    }

    async fn reserve(&self, id: Uuid, reservation: &Reservation) -> Result<(), ApiError> {
        wishes::ActiveModel {
            id: Set(id),
            reserved: Set(true),
            reserved_by: Set(Some(reservation.by)),
            reserved_by_name: Set(reservation.name.clone()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("reserve wish")?;
        Ok(())
    }

    async fn unreserve(&self, id: Uuid) -> Result<(), ApiError> {
        wishes::ActiveModel {
            id: Set(id),
            reserved: Set(false),
            reserved_by: Set(None),
            reserved_by_name: Set(None),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("unreserve wish")?;
        Ok(())
    }

    async fn mark_deleted(&self, id: Uuid) -> Result<(), ApiError> {
        wishes::ActiveModel {
            id: Set(id),
            deleted: Set(true),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("delete wish")?;
        Ok(())
    }
}

fn wish_from_model(model: wishes::Model) -> Wish {
    Wish {
        id: model.id,
        creator_id: model.creator_id,
        creator_name: model.creator_name,
        title: model.title,
        description: model.description,
        link: model.link,
        price: model.price,
        currency: model.currency,
        deleted: model.deleted,
        completed: model.completed,
        completed_reason: model.completed_reason,
        reserved: model.reserved,
        reserved_by: model.reserved_by,
        reserved_by_name: model.reserved_by_name,
        created_at: model.created_at,
    }
}
