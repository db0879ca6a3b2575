use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Airport::Table)
                    .if_not_exists()
                    .col(pk_auto(Airport::Id))
                    .col(string_len(Airport::Code, 10).not_null().unique_key())
                    .col(string_len(Airport::Name, 150).not_null().unique_key())
                    .col(string_len(Airport::City, 100).not_null())
                    .col(string_len(Airport::Country, 100).not_null())
                    .to_owned(),
            )
            .await?;

        // Seed a starter set of airports; the full list is synced from the
        // remote flight system out of band.
        let insert = Query::insert()
            .into_table(Airport::Table)
            .columns([Airport::Code, Airport::Name, Airport::City, Airport::Country])
            .values_panic([
                "YYZ".into(),
                "Toronto Pearson International Airport".into(),
                "Toronto".into(),
                "Canada".into(),
            ])
            .values_panic([
                "CDG".into(),
                "Charles de Gaulle Airport".into(),
                "Paris".into(),
                "France".into(),
            ])
            .values_panic([
                "ORY".into(),
                "Orly Airport".into(),
                "Paris".into(),
                "France".into(),
            ])
            .values_panic([
                "JFK".into(),
                "John F. Kennedy International Airport".into(),
                "New York".into(),
                "United States".into(),
            ])
            .values_panic([
                "LHR".into(),
                "Heathrow Airport".into(),
                "London".into(),
                "United Kingdom".into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Airport::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Airport {
    Table,
    Id,
    Code,
    Name,
    City,
    Country,
}
