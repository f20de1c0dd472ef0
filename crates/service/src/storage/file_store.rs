use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Result of persisting an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name as sent by the client, after validation
    pub original_name: String,
    /// Path relative to the store root
    pub relative_path: String,
    pub size: i64,
    /// Lower-cased extension without the dot, `"file"` when missing
    pub extension: String,
}

/// Directory-backed blob store.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create the root directory if missing.
    pub async fn new<P: Into<PathBuf>>(root: P) -> Result<Arc<Self>, ServiceError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(Arc::new(Self { root }))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under `<root>/<category>/<uuid>_<name>`.
    pub async fn save(&self, category: &str, original_name: &str, bytes: &[u8]) -> Result<StoredFile, ServiceError> {
        let name = sanitize_file_name(original_name)?;
        check_relative(category)?;
        let stored_name = format!("{}_{}", Uuid::new_v4(), name);
        let relative_path = format!("{}/{}", category.trim_matches('/'), stored_name);
        let full = self.root.join(&relative_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        }
        fs::write(&full, bytes).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        debug!(path = %relative_path, size = bytes.len(), "file stored");
        Ok(StoredFile {
            extension: extension_of(&name),
            original_name: name,
            relative_path,
            size: bytes.len() as i64,
        })
    }

    pub async fn read(&self, relative_path: &str) -> Result<Vec<u8>, ServiceError> {
        check_relative(relative_path)?;
        match fs::read(self.root.join(relative_path)).await {
            Ok(b) => Ok(b),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ServiceError::not_found("file")),
            Err(e) => Err(ServiceError::Storage(e.to_string())),
        }
    }

    pub async fn remove(&self, relative_path: &str) -> Result<(), ServiceError> {
        check_relative(relative_path)?;
        fs::remove_file(self.root.join(relative_path))
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }

    /// Best-effort removal of files whose rows are already gone.
    /// Failures are logged; returns how many files were removed.
    pub async fn remove_all(&self, relative_paths: &[String]) -> usize {
        let mut removed = 0;
        for path in relative_paths {
            match self.remove(path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(%path, error = %e, "stored file not removed"),
            }
        }
        removed
    }
}

/// Keep only the final path component and refuse traversal.
pub fn sanitize_file_name(name: &str) -> Result<String, ServiceError> {
    if name.contains("..") {
        return Err(ServiceError::Validation("file name must not contain '..'".into()));
    }
    let base = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if base.is_empty() {
        return Err(ServiceError::Validation("file name is empty".into()));
    }
    Ok(base.to_string())
}

pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => "file".to_string(),
    }
}

fn check_relative(path: &str) -> Result<(), ServiceError> {
    let ok = Path::new(path).components().all(|c| matches!(c, Component::Normal(_)));
    if !ok || path.is_empty() {
        return Err(ServiceError::Validation("invalid storage path".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_rejects_traversal() {
        assert!(sanitize_file_name("../etc/passwd").is_err());
        assert!(sanitize_file_name("a..b.pdf").is_err());
        assert_eq!(sanitize_file_name("C:\\docs\\scan.PDF").unwrap(), "scan.PDF");
        assert_eq!(sanitize_file_name("dir/report.docx").unwrap(), "report.docx");
        assert!(sanitize_file_name("  ").is_err());
    }

    #[test]
    fn extension_lowercased() {
        assert_eq!(extension_of("scan.PDF"), "pdf");
        assert_eq!(extension_of("README"), "file");
        assert_eq!(extension_of(".hidden"), "file");
    }

    #[tokio::test]
    async fn save_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).await.unwrap();
        let stored = store.save("tasks/7", "lease.pdf", b"%PDF-1.4").await.unwrap();
        assert!(stored.relative_path.starts_with("tasks/7/"));
        assert!(stored.relative_path.ends_with("_lease.pdf"));
        assert_eq!(stored.extension, "pdf");
        assert_eq!(stored.size, 8);

        assert_eq!(store.read(&stored.relative_path).await.unwrap(), b"%PDF-1.4");
        store.remove(&stored.relative_path).await.unwrap();
        assert!(matches!(store.read(&stored.relative_path).await, Err(ServiceError::NotFound(_))));
        assert!(store.remove(&stored.relative_path).await.is_err());
    }

    #[tokio::test]
    async fn remove_all_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).await.unwrap();
        let a = store.save("tasks/1", "a.pdf", b"a").await.unwrap();
        let b = store.save("tasks/1", "b.pdf", b"b").await.unwrap();
        let paths = vec![a.relative_path.clone(), "tasks/1/missing.pdf".to_string(), b.relative_path.clone()];
        assert_eq!(store.remove_all(&paths).await, 2);
        assert!(!dir.path().join(&a.relative_path).exists());
        assert!(!dir.path().join(&b.relative_path).exists());
    }

    #[tokio::test]
    async fn read_rejects_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).await.unwrap();
        assert!(matches!(store.read("/etc/passwd").await, Err(ServiceError::Validation(_))));
        assert!(matches!(store.read("../x").await, Err(ServiceError::Validation(_))));
    }
}
