//! Create `project_document` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProjectDocument::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProjectDocument::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(big_integer(ProjectDocument::ProjectId))
                    .col(string_len(ProjectDocument::Name, 255))
                    .col(string_len_null(ProjectDocument::DocType, 64))
                    .col(string_len(ProjectDocument::FilePath, 500))
                    .col(big_integer(ProjectDocument::Size))
                    .col(timestamp_with_time_zone(ProjectDocument::UploadedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_document_project")
                            .from(ProjectDocument::Table, ProjectDocument::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProjectDocument::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProjectDocument { Table, Id, ProjectId, Name, DocType, FilePath, Size, UploadedAt }

#[derive(DeriveIden)]
enum Project { Table, Id }
