use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hotel::Table)
                    .if_not_exists()
                    .col(uuid(Hotel::Id).primary_key())
                    .col(uuid(Hotel::OwnerId).not_null())
                    .col(string_len(Hotel::Name, 150).not_null())
                    .col(string_len(Hotel::Address, 255).not_null())
                    .col(string_len(Hotel::Location, 100).not_null())
                    .col(integer(Hotel::Rating).not_null())
                    .col(string_len_null(Hotel::Logo, 255))
                    .col(
                        timestamp_with_time_zone(Hotel::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hotel_owner")
                            .from(Hotel::Table, Hotel::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Hotel::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Hotel {
    Table,
    Id,
    OwnerId,
    Name,
    Address,
    Location,
    Rating,
    Logo,
    CreatedAt,
}
