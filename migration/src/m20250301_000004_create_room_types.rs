use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000003_create_hotels::Hotel;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoomType::Table)
                    .if_not_exists()
                    .col(uuid(RoomType::Id).primary_key())
                    .col(uuid(RoomType::HotelId).not_null())
                    .col(string_len(RoomType::Name, 100).not_null())
                    .col(double(RoomType::PricePerNight).not_null())
                    .col(integer(RoomType::Rooms).not_null())
                    .col(string_null(RoomType::Amenities))
                    .col(
                        timestamp_with_time_zone(RoomType::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_type_hotel")
                            .from(RoomType::Table, RoomType::HotelId)
                            .to(Hotel::Table, Hotel::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Room type names are unique within a hotel
        manager
            .create_index(
                Index::create()
                    .name("idx_room_type_hotel_name")
                    .table(RoomType::Table)
                    .col(RoomType::HotelId)
                    .col(RoomType::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoomType::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum RoomType {
    Table,
    Id,
    HotelId,
    Name,
    PricePerNight,
    Rooms,
    Amenities,
    CreatedAt,
}
