//! Create `project_task` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProjectTask::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProjectTask::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(big_integer(ProjectTask::ProjectId))
                    .col(string_len(ProjectTask::Name, 255))
                    .col(string_len(ProjectTask::TaskType, 128))
                    .col(string_len(ProjectTask::Responsible, 128))
                    .col(date(ProjectTask::NormativeDeadline))
                    .col(date_null(ProjectTask::ActualDate))
                    .col(string_len(ProjectTask::Status, 64))
                    .col(timestamp_with_time_zone(ProjectTask::CreatedAt))
                    .col(timestamp_with_time_zone_null(ProjectTask::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_task_project")
                            .from(ProjectTask::Table, ProjectTask::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProjectTask::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProjectTask {
    Table,
    Id,
    ProjectId,
    Name,
    TaskType,
    Responsible,
    NormativeDeadline,
    ActualDate,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Project { Table, Id }
