use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wishes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Wishes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Wishes::CreatorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Wishes::CreatorName)
                            .string_len(120)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Wishes::Title).string_len(120).not_null())
                    .col(ColumnDef::new(Wishes::Description).string_len(240))
                    .col(ColumnDef::new(Wishes::Link).string_len(1024))
                    .col(ColumnDef::new(Wishes::Price).string_len(32))
                    .col(ColumnDef::new(Wishes::Currency).string_len(3))
                    .col(
                        ColumnDef::new(Wishes::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Wishes::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Wishes::CompletedReason).string_len(120))
                    .col(
                        ColumnDef::new(Wishes::Reserved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Wishes::ReservedBy).uuid())
                    .col(ColumnDef::new(Wishes::ReservedByName).string_len(120))
                    .col(
                        ColumnDef::new(Wishes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Wishes::Table, Wishes::CreatorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Wishes::Table)
                    .col(Wishes::CreatorId)
                    .col(Wishes::CreatedAt)
                    .name("idx_wishes_creator_id_created_at")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Wishes::Table)
                    .col(Wishes::ReservedBy)
                    .name("idx_wishes_reserved_by")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Wishes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Wishes {
    Table,
    Id,
    CreatorId,
    CreatorName,
    Title,
    Description,
    Link,
    Price,
    Currency,
    Deleted,
    Completed,
    CompletedReason,
    Reserved,
    ReservedBy,
    ReservedByName,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
