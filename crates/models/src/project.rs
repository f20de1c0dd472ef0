use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

pub const DEFAULT_STATUS: &str = "Создан";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub store_id: i64,
    pub project_type: String,
    pub status: String,
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
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Store,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Store => Entity::belongs_to(crate::dev_store::Entity)
                .from(Column::StoreId)
                .to(crate::dev_store::Column::Id)
                .into(),
        }
    }
}

impl Related<crate::dev_store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Store.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(db: &DatabaseConnection, mut am: ActiveModel) -> Result<Model, ModelError> {
    errors::required_value("projectType", &am.project_type)?;
    let needs_default = am.status.try_as_ref().map_or(true, |s| s.trim().is_empty());
    if needs_default {
        am.status = Set(DEFAULT_STATUS.into());
    }
    am.id = NotSet;
    am.created_at = Set(Utc::now().into());
    am.updated_at = Set(None);
    am.insert(db).await.map_err(errors::db_err)
}
