//! Create transactions table

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;
use super::m20240101_000002_create_powerbank_stations::PowerbankStations;
use super::m20240101_000003_create_powerbanks::Powerbanks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).string().not_null())
                    .col(ColumnDef::new(Transactions::PowerbankId).integer())
                    .col(
                        ColumnDef::new(Transactions::OriginStationId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::ReturnStationId).integer())
                    .col(
                        ColumnDef::new(Transactions::Status)
                            .string()
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(Transactions::OrderId).string().unique_key())
                    .col(ColumnDef::new(Transactions::PaymentToken).string())
                    .col(ColumnDef::new(Transactions::PaymentRedirectUrl).string())
                    .col(ColumnDef::new(Transactions::Amount).big_integer())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::DateReturned).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_user")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_powerbank")
                            .from(Transactions::Table, Transactions::PowerbankId)
                            .to(Powerbanks::Table, Powerbanks::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_origin_station")
                            .from(Transactions::Table, Transactions::OriginStationId)
                            .to(PowerbankStations::Table, PowerbankStations::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_return_station")
                            .from(Transactions::Table, Transactions::ReturnStationId)
                            .to(PowerbankStations::Table, PowerbankStations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // History and active-rental lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_user_status")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Transactions {
    Table,
    Id,
    UserId,
    PowerbankId,
    OriginStationId,
    ReturnStationId,
    Status,
    OrderId,
    PaymentToken,
    PaymentRedirectUrl,
    Amount,
    CreatedAt,
    UpdatedAt,
    DateReturned,
}
