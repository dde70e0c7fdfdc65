//! Adds `geo_locations` and the pharmacy link column.
//!
//! `pharmacies.geo_location_id` is a plain indexed column: no foreign-key
//! constraint is declared, so a location deleted out of band leaves the link
//! dangling and the upsert workflow has to cope with it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum GeoLocations {
    Table,
    Id,
    Latitude,
    Longitude,
    UpdatedAt,
}

#[derive(Iden)]
enum Pharmacies {
    Table,
    GeoLocationId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GeoLocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GeoLocations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GeoLocations::Latitude).double().not_null())
                    .col(ColumnDef::new(GeoLocations::Longitude).double().not_null())
                    .col(
                        ColumnDef::new(GeoLocations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Pharmacies::Table)
                    .add_column(ColumnDef::new(Pharmacies::GeoLocationId).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pharmacies-geo_location_id-unique")
                    .table(Pharmacies::Table)
                    .col(Pharmacies::GeoLocationId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-pharmacies-geo_location_id-unique")
                    .table(Pharmacies::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Pharmacies::Table)
                    .drop_column(Pharmacies::GeoLocationId)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(GeoLocations::Table).to_owned())
            .await
    }
}
