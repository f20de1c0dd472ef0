use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::{info, instrument, warn};

use models::{project, project_document};

use crate::errors::ServiceError;
use crate::storage::FileStore;

#[instrument(skip(db, files, bytes), fields(size = bytes.len()))]
pub async fn upload_project_document(
    db: &DatabaseConnection,
    files: &FileStore,
    project_id: i64,
    file_name: &str,
    doc_type: Option<&str>,
    bytes: &[u8],
) -> Result<project_document::Model, ServiceError> {
    if bytes.is_empty() {
        return Err(ServiceError::Validation("file is empty".into()));
    }
    if project::Entity::find_by_id(project_id).count(db).await? == 0 {
        return Err(ServiceError::not_found("project"));
    }
    let stored = files.save(&format!("projects/{project_id}"), file_name, bytes).await?;
    let doc_type = doc_type.map(str::trim).filter(|t| !t.is_empty());
    match project_document::create(db, project_id, &stored.original_name, doc_type, &stored.relative_path, stored.size).await {
        Ok(doc) => {
            info!(document_id = doc.id, project_id, "project_document_uploaded");
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

pub async fn list_project_documents(db: &DatabaseConnection, project_id: i64) -> Result<Vec<project_document::Model>, ServiceError> {
    Ok(project_document::Entity::find()
        .filter(project_document::Column::ProjectId.eq(project_id))
        .order_by_desc(project_document::Column::UploadedAt)
        .all(db)
        .await?)
}

pub async fn download_project_document(
    db: &DatabaseConnection,
    files: &FileStore,
    id: i64,
) -> Result<(project_document::Model, Vec<u8>), ServiceError> {
    let doc = project_document::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("document"))?;
    let bytes = files.read(&doc.file_path).await?;
    Ok((doc, bytes))
}

#[instrument(skip(db, files))]
pub async fn delete_project_document(db: &DatabaseConnection, files: &FileStore, id: i64) -> Result<(), ServiceError> {
    let doc = project_document::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("document"))?;
    if let Err(e) = files.remove(&doc.file_path).await {
        warn!(document_id = id, path = %doc.file_path, error = %e, "document file not removed");
    }
    project_document::Entity::delete_by_id(id).exec(db).await?;
    info!(document_id = id, "project_document_deleted");
    Ok(())
}

/// Stored file paths of every document of the given projects.
pub async fn document_paths(db: &DatabaseConnection, project_ids: &[i64]) -> Result<Vec<String>, ServiceError> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(project_document::Entity::find()
        .select_only()
        .column(project_document::Column::FilePath)
        .filter(project_document::Column::ProjectId.is_in(project_ids.iter().copied()))
        .into_tuple::<String>()
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::development::{projects, stores};

    fn store_req() -> stores::DevStoreRequest {
        stores::DevStoreRequest {
            code: format!("DS-{}", &uuid::Uuid::new_v4().simple().to_string()[..10]),
            name: "Магазин у дома".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn deleting_project_or_store_removes_files() -> Result<(), anyhow::Error> {
        let Some(db) = crate::test_support::get_db().await else { return Ok(()) };
        let dir = tempfile::tempdir()?;
        let files = FileStore::new(dir.path()).await?;

        let store = stores::create_dev_store(&db, store_req()).await?;
        let project_req = || projects::ProjectRequest { store_id: store.id, project_type: "Открытие".into(), ..Default::default() };
        let first = projects::create_project(&db, project_req()).await?;
        let second = projects::create_project(&db, project_req()).await?;

        let plan = upload_project_document(&db, &files, first.project.id, "План.pdf", None, b"%PDF").await?;
        let photo = upload_project_document(&db, &files, second.project.id, "фото.jpg", Some("photo"), b"jpg").await?;
        assert_eq!(document_paths(&db, &[first.project.id, second.project.id]).await?.len(), 2);

        projects::delete_project(&db, &files, first.project.id).await?;
        assert!(!dir.path().join(&plan.file_path).exists());
        assert!(dir.path().join(&photo.file_path).exists());
        assert!(list_project_documents(&db, first.project.id).await?.is_empty());

        stores::delete_dev_store(&db, &files, store.id).await?;
        assert!(!dir.path().join(&photo.file_path).exists());
        assert!(matches!(projects::get_project(&db, second.project.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
