//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_app_user;
mod m20240101_000002_create_user_credentials;
mod m20240101_000003_create_region;
mod m20240101_000004_create_store;
mod m20240101_000005_create_task;
mod m20240101_000006_create_payment;
mod m20240101_000007_create_document;
mod m20240101_000008_create_egrn_extract;
mod m20240101_000009_create_dev_store;
mod m20240101_000010_create_project;
mod m20240101_000011_create_project_task;
mod m20240101_000012_create_project_document;
mod m20240101_000099_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_app_user::Migration),
            Box::new(m20240101_000002_create_user_credentials::Migration),
            Box::new(m20240101_000003_create_region::Migration),
            Box::new(m20240101_000004_create_store::Migration),
            Box::new(m20240101_000005_create_task::Migration),
            Box::new(m20240101_000006_create_payment::Migration),
            Box::new(m20240101_000007_create_document::Migration),
            Box::new(m20240101_000008_create_egrn_extract::Migration),
            Box::new(m20240101_000009_create_dev_store::Migration),
            Box::new(m20240101_000010_create_project::Migration),
            Box::new(m20240101_000011_create_project_task::Migration),
            Box::new(m20240101_000012_create_project_document::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000099_add_indexes::Migration),
        ]
    }
}
