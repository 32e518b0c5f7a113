//! Create powerbank_stations table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PowerbankStations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PowerbankStations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PowerbankStations::Name).string().not_null())
                    .col(ColumnDef::new(PowerbankStations::Latitude).double().not_null())
                    .col(ColumnDef::new(PowerbankStations::Longitude).double().not_null())
                    .col(ColumnDef::new(PowerbankStations::Capacity).integer().not_null())
                    .col(
                        ColumnDef::new(PowerbankStations::PowerbankLeft)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PowerbankStations::Address).string().not_null())
                    .col(
                        ColumnDef::new(PowerbankStations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .check(Expr::col(PowerbankStations::PowerbankLeft).gte(0))
                    .check(
                        Expr::col(PowerbankStations::PowerbankLeft)
                            .lte(Expr::col(PowerbankStations::Capacity)),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PowerbankStations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PowerbankStations {
    Table,
    Id,
    Name,
    Latitude,
    Longitude,
    Capacity,
    PowerbankLeft,
    Address,
    CreatedAt,
}
