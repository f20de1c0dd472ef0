use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dev_store")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub total_area: Option<f64>,
    pub trade_area: Option<f64>,
    pub status: String,
    pub opening_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::project::Entity")]
    Project,
}

impl Related<crate::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_areas(total: Option<f64>, trade: Option<f64>) -> Result<(), ModelError> {
    for v in [total, trade].into_iter().flatten() {
        if !v.is_finite() || v < 0.0 {
            return Err(ModelError::Validation("area must be a non-negative number".into()));
        }
    }
    if let (Some(t), Some(tr)) = (total, trade) {
        if tr > t {
            return Err(ModelError::Validation("trade area cannot exceed total area".into()));
        }
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, mut am: ActiveModel) -> Result<Model, ModelError> {
    errors::required_value("code", &am.code)?;
    errors::required_value("name", &am.name)?;
    let total = am.total_area.try_as_ref().copied().flatten();
    let trade = am.trade_area.try_as_ref().copied().flatten();
    validate_areas(total, trade)?;
    if am.status.is_not_set() {
        am.status = Set("Active".into());
    }
    am.id = NotSet;
    am.created_at = Set(Utc::now().into());
    am.insert(db)
        .await
        .map_err(|e| ModelError::from_db(e, "store code already exists"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_rules() {
        assert!(validate_areas(Some(500.0), Some(350.0)).is_ok());
        assert!(validate_areas(None, Some(350.0)).is_ok());
        assert!(validate_areas(Some(100.0), Some(350.0)).is_err());
        assert!(validate_areas(Some(-1.0), None).is_err());
    }
}
