//! Create `dev_store` table for the development portal (stores being opened
//! or reconstructed). Independent from the licensing `store` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DevStore::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DevStore::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len(DevStore::Code, 64).unique_key())
                    .col(string_len(DevStore::Name, 255))
                    .col(string_len_null(DevStore::Address, 500))
                    .col(string_len_null(DevStore::City, 128))
                    .col(string_len_null(DevStore::Region, 128))
                    .col(double_null(DevStore::TotalArea))
                    .col(double_null(DevStore::TradeArea))
                    .col(string_len(DevStore::Status, 32).default("Active"))
                    .col(date_null(DevStore::OpeningDate))
                    .col(timestamp_with_time_zone(DevStore::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(DevStore::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum DevStore { Table, Id, Code, Name, Address, City, Region, TotalArea, TradeArea, Status, OpeningDate, CreatedAt }
