pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_airports;
mod m20250301_000003_create_hotels;
mod m20250301_000004_create_room_types;
mod m20250301_000005_create_itineraries;
mod m20250301_000006_create_bookings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_airports::Migration),
            Box::new(m20250301_000003_create_hotels::Migration),
            Box::new(m20250301_000004_create_room_types::Migration),
            Box::new(m20250301_000005_create_itineraries::Migration),
            Box::new(m20250301_000006_create_bookings::Migration),
        ]
    }
}
