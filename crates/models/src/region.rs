use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "region")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub license_type: Option<String>,
    pub name: String,
    pub region_code: Option<String>,
    pub region_giid: Option<String>,
    pub counterparty_code: Option<String>,
    pub counterparty_inn: Option<String>,
    pub kpp: Option<String>,
    pub settlement_bik: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Insert a region. `id`, `created_at` and `updated_at` are assigned here.
pub async fn create(db: &DatabaseConnection, mut am: ActiveModel) -> Result<Model, ModelError> {
    errors::required_value("name", &am.name)?;
    am.id = NotSet;
    am.created_at = Set(Utc::now().into());
    am.updated_at = Set(None);
    am.insert(db).await.map_err(errors::db_err)
}
