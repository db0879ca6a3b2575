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
                    .table(Itinerary::Table)
                    .if_not_exists()
                    .col(uuid(Itinerary::Id).primary_key())
                    .col(uuid(Itinerary::UserId).not_null())
                    .col(double(Itinerary::TotalPrice).not_null())
                    .col(json_binary(Itinerary::PaymentInfo).not_null())
                    .col(
                        timestamp_with_time_zone(Itinerary::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_itinerary_user")
                            .from(Itinerary::Table, Itinerary::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Itinerary::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Itinerary {
    Table,
    Id,
    UserId,
    TotalPrice,
    PaymentInfo,
    CreatedAt,
}
