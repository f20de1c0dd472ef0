//! Create `region` reference table (licensing authority requisites per region).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Region::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Region::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len_null(Region::LicenseType, 100))
                    .col(string_len(Region::Name, 200))
                    .col(string_len_null(Region::RegionCode, 50))
                    .col(string_len_null(Region::RegionGiid, 100))
                    .col(string_len_null(Region::CounterpartyCode, 50))
                    .col(string_len_null(Region::CounterpartyInn, 20))
                    .col(string_len_null(Region::Kpp, 20))
                    .col(string_len_null(Region::SettlementBik, 20))
                    .col(timestamp_with_time_zone(Region::CreatedAt))
                    .col(timestamp_with_time_zone_null(Region::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Region::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Region {
    Table,
    Id,
    LicenseType,
    Name,
    RegionCode,
    RegionGiid,
    CounterpartyCode,
    CounterpartyInn,
    Kpp,
    SettlementBik,
    CreatedAt,
    UpdatedAt,
}
