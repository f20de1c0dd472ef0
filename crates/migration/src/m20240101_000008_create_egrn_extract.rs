//! Create `egrn_extract` table: real-estate register extract requests.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EgrnExtract::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EgrnExtract::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len_null(EgrnExtract::ApplicantType, 64))
                    .col(string_len_null(EgrnExtract::Phone, 32))
                    .col(string_len_null(EgrnExtract::Email, 255))
                    .col(string_len(EgrnExtract::CadastralNumber, 64))
                    .col(string_len_null(EgrnExtract::ObjectType, 64))
                    .col(string_len_null(EgrnExtract::Mvz, 16))
                    .col(string_len(EgrnExtract::Status, 16))
                    .col(timestamp_with_time_zone(EgrnExtract::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(EgrnExtract::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum EgrnExtract {
    Table,
    Id,
    ApplicantType,
    Phone,
    Email,
    CadastralNumber,
    ObjectType,
    Mvz,
    Status,
    CreatedAt,
}
