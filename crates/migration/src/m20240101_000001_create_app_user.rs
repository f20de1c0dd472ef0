//! Create `app_user` table.
//!
//! Portal accounts; roles are stored as a comma separated list.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppUser::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AppUser::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len(AppUser::Username, 64).unique_key())
                    .col(string_len_null(AppUser::Email, 255))
                    .col(string_len(AppUser::FullName, 255))
                    .col(string_len_null(AppUser::Position, 255))
                    .col(string_len_null(AppUser::Department, 255))
                    .col(string_len(AppUser::Roles, 128).default(""))
                    .col(boolean(AppUser::IsActive).default(true))
                    .col(timestamp_with_time_zone(AppUser::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AppUser::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AppUser { Table, Id, Username, Email, FullName, Position, Department, Roles, IsActive, CreatedAt }
