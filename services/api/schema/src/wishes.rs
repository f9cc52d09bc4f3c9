use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wishes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    /// Two-decimal string, null together with `currency`.
    pub price: Option<String>,
    pub currency: Option<String>,
    pub deleted: bool,
    pub completed: bool,
    pub completed_reason: Option<String>,
    pub reserved: bool,
    pub reserved_by: Option<Uuid>,
    pub reserved_by_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatorId",
        to = "super::users::Column::Id"
    )]
    Creator,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
