#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::connect_with_config;

// Migrations run once per test process; `false` means the database is unusable
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> configs::DatabaseConfig {
    let mut cfg = configs::DatabaseConfig::default();
    cfg.normalize_from_env();
    cfg.max_connections = cfg.max_connections.max(5);
    cfg.min_connections = 1;
    cfg.acquire_timeout_secs = 10;
    cfg.connect_timeout_secs = 5;
    cfg
}

/// Migrated connection, or `None` when DB tests are disabled or unreachable.
pub async fn get_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let ready = *MIGRATED
        .get_or_init(|| async {
            let db = match connect_with_config(&test_config()).await {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("skip: cannot connect to db: {e}");
                    return false;
                }
            };
            if let Err(e) = migration::Migrator::up(&db, None).await {
                eprintln!("skip: migrate up failed: {e}");
                return false;
            }
            true
        })
        .await;
    if !ready {
        return None;
    }
    // Fresh pool bound to the calling test's runtime
    connect_with_config(&test_config()).await.ok()
}
