//! Create `store` table.
//!
//! Retail outlets with their alcohol/tobacco license expiry dates. INN is unique.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Store::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Store::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len_null(Store::Mvz, 10))
                    .col(string_len(Store::Name, 200))
                    .col(string_len(Store::Address, 300))
                    .col(string_len_null(Store::Cfo, 10))
                    .col(string_len_null(Store::Oktmo, 11))
                    .col(boolean(Store::HasRestriction).default(false))
                    .col(string_len_null(Store::MunArea, 100))
                    .col(string_len_null(Store::MunDistrict, 100))
                    .col(string_len_null(Store::Be, 200))
                    .col(date_null(Store::CloseDate))
                    .col(string_len_null(Store::DirectorPhone, 20))
                    .col(string_len(Store::Inn, 12).unique_key())
                    .col(string_len_null(Store::Kpp, 9))
                    .col(string_len_null(Store::ContactPerson, 100))
                    .col(string_len_null(Store::Phone, 20))
                    .col(string_len_null(Store::Email, 100))
                    .col(date_null(Store::AlcoholLicenseExpiry))
                    .col(date_null(Store::TobaccoLicenseExpiry))
                    .col(boolean(Store::IsActive).default(true))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Store::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Store {
    Table,
    Id,
    Mvz,
    Name,
    Address,
    Cfo,
    Oktmo,
    HasRestriction,
    MunArea,
    MunDistrict,
    Be,
    CloseDate,
    DirectorPhone,
    Inn,
    Kpp,
    ContactPerson,
    Phone,
    Email,
    AlcoholLicenseExpiry,
    TobaccoLicenseExpiry,
    IsActive,
}
