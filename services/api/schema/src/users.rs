use sea_orm::entity::prelude::*;

/// Account record. Public profile links and provider ids are flattened into columns.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: Option<String>,
    /// `None` for accounts created through social login.
    pub password_hash: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub verified: bool,
    pub profile_facebook: Option<String>,
    pub profile_twitter: Option<String>,
    pub social_google: Option<String>,
    pub social_facebook: Option<String>,
    pub style_avatar: Option<String>,
    pub style_background: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_tokens::Entity")]
    UserTokens,
}

impl Related<super::user_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
