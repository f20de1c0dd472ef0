use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::{dev_store, project};

use super::documents;
use crate::errors::ServiceError;
use crate::storage::FileStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub store_id: i64,
    #[serde(default)]
    pub project_type: String,
    pub status: Option<String>,
    pub gis_code: Option<String>,
    pub address: Option<String>,
    pub total_area: Option<f64>,
    pub trade_area: Option<f64>,
    pub region: Option<String>,
    pub cfo: Option<String>,
    pub mp: Option<String>,
    pub nor: Option<String>,
    pub st_mriz: Option<String>,
    pub rnr: Option<String>,
}

impl ProjectRequest {
    fn apply(self, am: &mut project::ActiveModel) {
        am.store_id = Set(self.store_id);
        am.project_type = Set(self.project_type.trim().to_string());
        if let Some(s) = self.status.filter(|s| !s.trim().is_empty()) {
            am.status = Set(s);
        }
        am.gis_code = Set(self.gis_code);
        am.address = Set(self.address);
        am.total_area = Set(self.total_area);
        am.trade_area = Set(self.trade_area);
        am.region = Set(self.region);
        am.cfo = Set(self.cfo);
        am.mp = Set(self.mp);
        am.nor = Set(self.nor);
        am.st_mriz = Set(self.st_mriz);
        am.rnr = Set(self.rnr);
    }
}

/// Project with its store inlined.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: project::Model,
    pub store: Option<dev_store::Model>,
}

pub async fn list_projects(db: &DatabaseConnection) -> Result<Vec<ProjectView>, ServiceError> {
    let rows = project::Entity::find()
        .find_also_related(dev_store::Entity)
        .order_by_desc(project::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|(project, store)| ProjectView { project, store }).collect())
}

pub async fn get_project(db: &DatabaseConnection, id: i64) -> Result<ProjectView, ServiceError> {
    let (project, store) = project::Entity::find_by_id(id)
        .find_also_related(dev_store::Entity)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("project"))?;
    Ok(ProjectView { project, store })
}

async fn ensure_store(db: &DatabaseConnection, store_id: i64) -> Result<(), ServiceError> {
    if dev_store::Entity::find_by_id(store_id).count(db).await? == 0 {
        return Err(ServiceError::Validation(format!("store {store_id} does not exist")));
    }
    Ok(())
}

#[instrument(skip(db, req), fields(store_id = req.store_id))]
pub async fn create_project(db: &DatabaseConnection, req: ProjectRequest) -> Result<ProjectView, ServiceError> {
    ensure_store(db, req.store_id).await?;
    let mut am = <project::ActiveModel as Default>::default();
    req.apply(&mut am);
    let created = project::create(db, am).await?;
    info!(project_id = created.id, "project_created");
    get_project(db, created.id).await
}

#[instrument(skip(db, req))]
pub async fn update_project(db: &DatabaseConnection, id: i64, req: ProjectRequest) -> Result<ProjectView, ServiceError> {
    if req.project_type.trim().is_empty() {
        return Err(ServiceError::Validation("projectType is required".into()));
    }
    let existing = get_project(db, id).await?.project;
    if existing.store_id != req.store_id {
        ensure_store(db, req.store_id).await?;
    }
    let mut am: project::ActiveModel = existing.into();
    req.apply(&mut am);
    am.updated_at = Set(Some(Utc::now().into()));
    am.update(db).await?;
    info!(project_id = id, "project_updated");
    get_project(db, id).await
}

#[instrument(skip(db))]
pub async fn update_project_status(db: &DatabaseConnection, id: i64, status: &str) -> Result<ProjectView, ServiceError> {
    let status = status.trim();
    if status.is_empty() {
        return Err(ServiceError::Validation("status is required".into()));
    }
    let mut am: project::ActiveModel = get_project(db, id).await?.project.into();
    am.status = Set(status.to_string());
    am.updated_at = Set(Some(Utc::now().into()));
    am.update(db).await?;
    info!(project_id = id, status, "project_status_changed");
    get_project(db, id).await
}

/// Deleting a project drops its tasks and documents; document files are removed after the row.
#[instrument(skip(db, files))]
pub async fn delete_project(db: &DatabaseConnection, files: &FileStore, id: i64) -> Result<(), ServiceError> {
    let paths = documents::document_paths(db, &[id]).await?;
    let res = project::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("project"));
    }
    let removed = files.remove_all(&paths).await;
    info!(project_id = id, files_removed = removed, "project_deleted");
    Ok(())
}
