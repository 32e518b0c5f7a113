//! Create powerbanks table

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_powerbank_stations::PowerbankStations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Powerbanks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Powerbanks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Powerbanks::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(Powerbanks::CapacityMah).integer().not_null())
                    .col(
                        ColumnDef::new(Powerbanks::Status)
                            .string()
                            .not_null()
                            .default("Available"),
                    )
                    .col(ColumnDef::new(Powerbanks::CurrentStationId).integer())
                    .col(
                        ColumnDef::new(Powerbanks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_powerbanks_station")
                            .from(Powerbanks::Table, Powerbanks::CurrentStationId)
                            .to(PowerbankStations::Table, PowerbankStations::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Reservation picks the first available unit of a station
        manager
            .create_index(
                Index::create()
                    .name("idx_powerbanks_station_status")
                    .table(Powerbanks::Table)
                    .col(Powerbanks::CurrentStationId)
                    .col(Powerbanks::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Powerbanks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Powerbanks {
    Table,
    Id,
    Code,
    CapacityMah,
    Status,
    CurrentStationId,
    UpdatedAt,
}
