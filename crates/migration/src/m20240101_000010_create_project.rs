//! Create `project` table (opening/reconstruction project for a `dev_store`).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Project::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(big_integer(Project::StoreId))
                    .col(string_len(Project::ProjectType, 64))
                    .col(string_len(Project::Status, 64))
                    .col(string_len_null(Project::GisCode, 64))
                    .col(string_len_null(Project::Address, 500))
                    .col(double_null(Project::TotalArea))
                    .col(double_null(Project::TradeArea))
                    .col(string_len_null(Project::Region, 128))
                    .col(string_len_null(Project::Cfo, 64))
                    .col(string_len_null(Project::Mp, 128))
                    .col(string_len_null(Project::Nor, 128))
                    .col(string_len_null(Project::StMriz, 128))
                    .col(string_len_null(Project::Rnr, 128))
                    .col(timestamp_with_time_zone(Project::CreatedAt))
                    .col(timestamp_with_time_zone_null(Project::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_dev_store")
                            .from(Project::Table, Project::StoreId)
                            .to(DevStore::Table, DevStore::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Project::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Project {
    Table,
    Id,
    StoreId,
    ProjectType,
    Status,
    GisCode,
    Address,
    TotalArea,
    TradeArea,
    Region,
    Cfo,
    Mp,
    Nor,
    StMriz,
    Rnr,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DevStore { Table, Id }
