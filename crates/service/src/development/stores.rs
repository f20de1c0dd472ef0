use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::{dev_store, project};
use models::errors::ModelError;

use super::documents;
use crate::errors::ServiceError;
use crate::storage::FileStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevStoreRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub total_area: Option<f64>,
    pub trade_area: Option<f64>,
    pub status: Option<String>,
    pub opening_date: Option<NaiveDate>,
}

impl DevStoreRequest {
    fn apply(self, am: &mut dev_store::ActiveModel) {
        am.code = Set(self.code.trim().to_string());
        am.name = Set(self.name.trim().to_string());
        am.address = Set(self.address);
        am.city = Set(self.city);
        am.region = Set(self.region);
        am.total_area = Set(self.total_area);
        am.trade_area = Set(self.trade_area);
        if let Some(s) = self.status.filter(|s| !s.trim().is_empty()) {
            am.status = Set(s);
        }
        am.opening_date = Set(self.opening_date);
    }
}

pub async fn list_dev_stores(db: &DatabaseConnection) -> Result<Vec<dev_store::Model>, ServiceError> {
    Ok(dev_store::Entity::find().order_by_asc(dev_store::Column::Name).all(db).await?)
}

pub async fn get_dev_store(db: &DatabaseConnection, id: i64) -> Result<dev_store::Model, ServiceError> {
    dev_store::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("store"))
}

#[instrument(skip(db, req), fields(code = %req.code))]
pub async fn create_dev_store(db: &DatabaseConnection, req: DevStoreRequest) -> Result<dev_store::Model, ServiceError> {
    let mut am = <dev_store::ActiveModel as Default>::default();
    req.apply(&mut am);
    let created = dev_store::create(db, am).await?;
    info!(dev_store_id = created.id, "dev_store_created");
    Ok(created)
}

#[instrument(skip(db, req))]
pub async fn update_dev_store(db: &DatabaseConnection, id: i64, req: DevStoreRequest) -> Result<dev_store::Model, ServiceError> {
    if req.code.trim().is_empty() || req.name.trim().is_empty() {
        return Err(ServiceError::Validation("code and name are required".into()));
    }
    dev_store::validate_areas(req.total_area, req.trade_area)?;
    let mut am: dev_store::ActiveModel = get_dev_store(db, id).await?.into();
    req.apply(&mut am);
    let updated = am.update(db).await.map_err(|e| ModelError::from_db(e, "store code already exists"))?;
    info!(dev_store_id = id, "dev_store_updated");
    Ok(updated)
}

/// Deleting a store removes its projects and their document files.
#[instrument(skip(db, files))]
pub async fn delete_dev_store(db: &DatabaseConnection, files: &FileStore, id: i64) -> Result<(), ServiceError> {
    let project_ids: Vec<i64> = project::Entity::find()
        .select_only()
        .column(project::Column::Id)
        .filter(project::Column::StoreId.eq(id))
        .into_tuple::<i64>()
        .all(db)
        .await?;
    let paths = documents::document_paths(db, &project_ids).await?;
    let res = dev_store::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("store"));
    }
    let removed = files.remove_all(&paths).await;
    info!(dev_store_id = id, projects = project_ids.len(), files_removed = removed, "dev_store_deleted");
    Ok(())
}
