//! Create `task` table.
//!
//! Licensing tasks and their subtasks (`parent_task_id`). Enum columns hold
//! upper-case string values.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Task::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Task::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len(Task::Title, 255))
                    .col(text_null(Task::Description))
                    .col(string_len(Task::LicenseType, 16))
                    .col(string_len(Task::ActionType, 16))
                    .col(string_len(Task::Status, 16))
                    .col(text_null(Task::StatusReason))
                    .col(big_integer_null(Task::StoreId))
                    .col(big_integer_null(Task::AssigneeId))
                    .col(big_integer_null(Task::CreatedById))
                    .col(date_null(Task::DeadlineDate))
                    .col(big_integer_null(Task::ParentTaskId))
                    .col(string_len_null(Task::SubtaskType, 32))
                    .col(date_null(Task::PlannedStartDate))
                    .col(date_null(Task::PlannedEndDate))
                    .col(date_null(Task::ActualStartDate))
                    .col(date_null(Task::ActualEndDate))
                    .col(timestamp_with_time_zone(Task::CreatedAt))
                    .col(timestamp_with_time_zone_null(Task::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_store")
                            .from(Task::Table, Task::StoreId)
                            .to(Store::Table, Store::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_assignee")
                            .from(Task::Table, Task::AssigneeId)
                            .to(AppUser::Table, AppUser::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_created_by")
                            .from(Task::Table, Task::CreatedById)
                            .to(AppUser::Table, AppUser::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_parent")
                            .from(Task::Table, Task::ParentTaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Task::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Task {
    Table,
    Id,
    Title,
    Description,
    LicenseType,
    ActionType,
    Status,
    StatusReason,
    StoreId,
    AssigneeId,
    CreatedById,
    DeadlineDate,
    ParentTaskId,
    SubtaskType,
    PlannedStartDate,
    PlannedEndDate,
    ActualStartDate,
    ActualEndDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Store { Table, Id }

#[derive(DeriveIden)]
enum AppUser { Table, Id }
