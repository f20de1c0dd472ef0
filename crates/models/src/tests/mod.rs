use migration::MigratorTrait;
use sea_orm::DatabaseConnection;


/// CRUD operations tests for the licensing entities
pub mod crud_tests;

/// Connect and migrate, or `None` when no database is reachable.
pub(crate) async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        println!("Skipping database tests (SKIP_DB_TESTS is set)");
        return None;
    }
    let db = match crate::db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}
