//! Create `document` table: files uploaded against a task.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Document::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Document::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(big_integer(Document::TaskId))
                    .col(string_len(Document::DocumentType, 100))
                    .col(string_len(Document::FileName, 255))
                    .col(string_len(Document::FilePath, 500))
                    .col(big_integer(Document::FileSize))
                    .col(string_len(Document::Status, 20))
                    .col(big_integer_null(Document::UploadedById))
                    .col(timestamp_with_time_zone(Document::UploadDate))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_task")
                            .from(Document::Table, Document::TaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_uploaded_by")
                            .from(Document::Table, Document::UploadedById)
                            .to(AppUser::Table, AppUser::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Document::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Document {
    Table,
    Id,
    TaskId,
    DocumentType,
    FileName,
    FilePath,
    FileSize,
    Status,
    UploadedById,
    UploadDate,
}

#[derive(DeriveIden)]
enum Task { Table, Id }

#[derive(DeriveIden)]
enum AppUser { Table, Id }
