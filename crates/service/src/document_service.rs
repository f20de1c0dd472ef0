use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::{info, instrument, warn};

use models::{document, task};

use crate::errors::ServiceError;
use crate::storage::FileStore;

/// Store an uploaded file for a task and record it.
/// The stored name is uuid-prefixed; the extension becomes the document type.
#[instrument(skip(db, files, bytes), fields(size = bytes.len()))]
pub async fn upload_document(
    db: &DatabaseConnection,
    files: &FileStore,
    task_id: i64,
    file_name: &str,
    bytes: &[u8],
    uploaded_by: Option<i64>,
) -> Result<document::Model, ServiceError> {
    if bytes.is_empty() {
        return Err(ServiceError::Validation("file is empty".into()));
    }
    if task::Entity::find_by_id(task_id).count(db).await? == 0 {
        return Err(ServiceError::not_found("task"));
    }
    let stored = files.save(&format!("tasks/{task_id}"), file_name, bytes).await?;
    let created = document::create(
        db,
        task_id,
        &stored.original_name,
        &stored.relative_path,
        stored.size,
        &stored.extension,
        uploaded_by,
    )
    .await;
    match created {
        Ok(doc) => {
            info!(document_id = doc.id, task_id, "document_uploaded");
            Ok(doc)
        }
        Err(e) => {
            if let Err(rm) = files.remove(&stored.relative_path).await {
                warn!(path = %stored.relative_path, error = %rm, "orphan file not removed");
            }
            Err(e.into())
        }
    }
}

pub async fn list_documents(db: &DatabaseConnection, task_id: i64) -> Result<Vec<document::Model>, ServiceError> {
    Ok(document::Entity::find()
        .filter(document::Column::TaskId.eq(task_id))
        .order_by_desc(document::Column::UploadDate)
        .all(db)
        .await?)
}

pub async fn get_document(db: &DatabaseConnection, id: i64) -> Result<document::Model, ServiceError> {
    document::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("document"))
}

/// Metadata plus file contents.
pub async fn download_document(
    db: &DatabaseConnection,
    files: &FileStore,
    id: i64,
) -> Result<(document::Model, Vec<u8>), ServiceError> {
    let doc = get_document(db, id).await?;
    let bytes = files.read(&doc.file_path).await?;
    Ok((doc, bytes))
}

/// Delete the row; a file that cannot be removed is only logged.
#[instrument(skip(db, files))]
pub async fn delete_document(db: &DatabaseConnection, files: &FileStore, id: i64) -> Result<(), ServiceError> {
    let doc = get_document(db, id).await?;
    if let Err(e) = files.remove(&doc.file_path).await {
        warn!(document_id = id, path = %doc.file_path, error = %e, "document file not removed");
    }
    document::Entity::delete_by_id(id).exec(db).await?;
    info!(document_id = id, "document_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Set;

    #[tokio::test]
    async fn upload_download_delete() -> Result<(), anyhow::Error> {
        let Some(db) = crate::test_support::get_db().await else { return Ok(()) };
        let dir = tempfile::tempdir()?;
        let files = FileStore::new(dir.path()).await?;

        let t = task::create(&db, task::ActiveModel {
            title: Set("Документы".into()),
            license_type: Set(task::LicenseType::Alcohol),
            action_type: Set(task::ActionType::New),
            ..Default::default()
        })
        .await?;

        let doc = upload_document(&db, &files, t.id, "Договор аренды.PDF", b"%PDF", None).await?;
        assert_eq!(doc.document_type, "pdf");
        assert_eq!(doc.file_name, "Договор аренды.PDF");
        assert!(doc.file_path.starts_with(&format!("tasks/{}/", t.id)));
        assert_eq!(list_documents(&db, t.id).await?.len(), 1);

        let (_, bytes) = download_document(&db, &files, doc.id).await?;
        assert_eq!(bytes, b"%PDF");

        assert!(matches!(
            upload_document(&db, &files, t.id, "../evil.sh", b"x", None).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(upload_document(&db, &files, i64::MAX, "a.pdf", b"x", None).await, Err(ServiceError::NotFound(_))));

        // file gone from disk, row still deleted
        files.remove(&doc.file_path).await?;
        delete_document(&db, &files, doc.id).await?;
        assert!(matches!(get_document(&db, doc.id).await, Err(ServiceError::NotFound(_))));

        task::Entity::delete_by_id(t.id).exec(&db).await?;
        Ok(())
    }
}
