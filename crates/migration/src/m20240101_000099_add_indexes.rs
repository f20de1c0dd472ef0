use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INDEXES: &[(&str, &str, &str)] = &[
    ("idx_task_assignee", "task", "assignee_id"),
    ("idx_task_parent", "task", "parent_task_id"),
    ("idx_task_store", "task", "store_id"),
    ("idx_task_deadline", "task", "deadline_date"),
    ("idx_payment_task", "payment", "task_id"),
    ("idx_document_task", "document", "task_id"),
    ("idx_project_store", "project", "store_id"),
    ("idx_project_task_project", "project_task", "project_id"),
    ("idx_project_document_project", "project_document", "project_id"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, col) in INDEXES {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(*name)
                        .table(Alias::new(*table))
                        .col(Alias::new(*col))
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _) in INDEXES {
            manager
                .drop_index(Index::drop().name(*name).table(Alias::new(*table)).to_owned())
                .await?;
        }
        Ok(())
    }
}
