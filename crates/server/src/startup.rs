use std::net::SocketAddr;

use axum::Router;
use common::geo::GeoClient;
use configs::AppConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::mail::mailer_from_config;
use service::storage::FileStore;
use service::{renewal, seed};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(cfg.server.port);
    format!("{}:{}", cfg.server.host, port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Everything the handlers need, built from config and a live connection.
pub async fn build_state(db: DatabaseConnection, cfg: AppConfig) -> Result<ServerState, StartupError> {
    let files = FileStore::new(&cfg.storage.upload_dir)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;
    let mailer = mailer_from_config(&cfg.mail).map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    if !cfg.mail.is_enabled() {
        warn!("smtp host not configured, outgoing mail disabled");
    }
    let geo = GeoClient::new(&cfg.geo.nominatim_url, &cfg.geo.overpass_url, &cfg.geo.user_agent, cfg.geo.timeout_secs)
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    Ok(ServerState::new(db, cfg, files, mailer, geo))
}

pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Connect, migrate, seed, start the renewal planner and serve until `shutdown` resolves.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    common::env::ensure_env(&cfg.storage.upload_dir).await?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    info!("migrations applied");

    let state = build_state(db.clone(), cfg.clone()).await?;

    let seed_repo = SeaOrmAuthRepository { db: db.clone() };
    let report = seed::run(&db, state.auth.as_ref(), &seed_repo, service::tasks::service::today()).await?;
    info!(users = report.users, regions = report.regions, stores = report.stores, "seed complete");

    let renewal_task = cfg.renewal.enabled.then(|| renewal::spawn(db.clone(), cfg.renewal.clone()));

    let app = build_app(state);
    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    if let Some(handle) = renewal_task {
        handle.abort();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_uses_config() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "0.0.0.0".into();
        cfg.server.port = 9090;
        if std::env::var("SERVER_PORT").is_err() {
            assert_eq!(bind_addr(&cfg).unwrap().port(), 9090);
        }
        cfg.server.host = "not a host".into();
        assert!(bind_addr(&cfg).is_err());
    }

    #[test]
    fn state_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone + 'static>() {}
        assert_send_sync::<ServerState>();
    }
}
