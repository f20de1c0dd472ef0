//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::info;

/// Create the upload directory if it is missing.
pub async fn ensure_env(upload_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(upload_dir).await.is_err() {
        info!(%upload_dir, "creating upload directory");
    }
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {upload_dir}: {e}"))?;
    Ok(())
}
