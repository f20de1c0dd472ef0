use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::region;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRequest {
    pub license_type: Option<String>,
    pub name: Option<String>,
    pub region_code: Option<String>,
    pub region_giid: Option<String>,
    pub counterparty_code: Option<String>,
    pub counterparty_inn: Option<String>,
    pub kpp: Option<String>,
    pub settlement_bik: Option<String>,
}

impl RegionRequest {
    /// Copy every present field onto `am`, leaving absent ones untouched.
    fn merge_into(self, am: &mut region::ActiveModel) {
        if let Some(v) = self.name {
            am.name = Set(v.trim().to_string());
        }
        let optional = [
            (self.license_type, &mut am.license_type),
            (self.region_code, &mut am.region_code),
            (self.region_giid, &mut am.region_giid),
            (self.counterparty_code, &mut am.counterparty_code),
            (self.counterparty_inn, &mut am.counterparty_inn),
            (self.kpp, &mut am.kpp),
            (self.settlement_bik, &mut am.settlement_bik),
        ];
        for (value, slot) in optional {
            if value.is_some() {
                *slot = Set(value);
            }
        }
    }
}

pub async fn list_regions(db: &DatabaseConnection) -> Result<Vec<region::Model>, ServiceError> {
    Ok(region::Entity::find().order_by_asc(region::Column::RegionCode).all(db).await?)
}

pub async fn get_region(db: &DatabaseConnection, id: i64) -> Result<region::Model, ServiceError> {
    region::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("region"))
}

#[instrument(skip(db, req))]
pub async fn create_region(db: &DatabaseConnection, req: RegionRequest) -> Result<region::Model, ServiceError> {
    let mut am = <region::ActiveModel as Default>::default();
    req.merge_into(&mut am);
    let created = region::create(db, am).await?;
    info!(region_id = created.id, name = %created.name, "region_created");
    Ok(created)
}

/// Partial update: only fields present in `req` change.
#[instrument(skip(db, req))]
pub async fn update_region(db: &DatabaseConnection, id: i64, req: RegionRequest) -> Result<region::Model, ServiceError> {
    if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ServiceError::Validation("name must not be empty".into()));
    }
    let mut am: region::ActiveModel = get_region(db, id).await?.into();
    req.merge_into(&mut am);
    am.updated_at = Set(Some(Utc::now().into()));
    let updated = am.update(db).await?;
    info!(region_id = id, "region_updated");
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete_region(db: &DatabaseConnection, id: i64) -> Result<(), ServiceError> {
    let res = region::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("region"));
    }
    info!(region_id = id, "region_deleted");
    Ok(())
}

/// Case-insensitive substring match on the region name.
pub async fn search_regions(db: &DatabaseConnection, name: &str) -> Result<Vec<region::Model>, ServiceError> {
    let pattern = format!("%{}%", name.trim().to_lowercase());
    Ok(region::Entity::find()
        .filter(Expr::expr(Func::lower(Expr::col(region::Column::Name))).like(pattern))
        .order_by_asc(region::Column::Name)
        .all(db)
        .await?)
}

pub async fn regions_by_license_type(db: &DatabaseConnection, license_type: &str) -> Result<Vec<region::Model>, ServiceError> {
    Ok(region::Entity::find()
        .filter(region::Column::LicenseType.eq(license_type))
        .order_by_asc(region::Column::RegionCode)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn region_partial_update_keeps_missing_fields() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let marker = uuid::Uuid::new_v4().simple().to_string();
        let created = create_region(&db, RegionRequest {
            name: Some(format!("Region {marker}")),
            region_code: Some("99".into()),
            license_type: Some("Табачная продукция".into()),
            ..Default::default()
        })
        .await?;
        assert!(created.updated_at.is_none());

        let updated = update_region(&db, created.id, RegionRequest { kpp: Some("770101001".into()), ..Default::default() }).await?;
        assert_eq!(updated.region_code.as_deref(), Some("99"));
        assert_eq!(updated.kpp.as_deref(), Some("770101001"));
        assert!(updated.updated_at.is_some());

        let found = search_regions(&db, &marker.to_uppercase()).await?;
        assert_eq!(found.len(), 1);

        assert!(matches!(
            update_region(&db, created.id, RegionRequest { name: Some(" ".into()), ..Default::default() }).await,
            Err(ServiceError::Validation(_))
        ));
        delete_region(&db, created.id).await?;
        assert!(matches!(delete_region(&db, created.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn create_requires_name() {
        let Some(db) = get_db().await else { return };
        let err = create_region(&db, RegionRequest::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
