use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

pub const DEFAULT_STATUS: &str = "Назначена";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_task")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub task_type: String,
    pub responsible: String,
    pub normative_deadline: Date,
    pub actual_date: Option<Date>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Project,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Project => Entity::belongs_to(crate::project::Entity)
                .from(Column::ProjectId)
                .to(crate::project::Column::Id)
                .into(),
        }
    }
}

impl Related<crate::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(db: &DatabaseConnection, mut am: ActiveModel) -> Result<Model, ModelError> {
    errors::required_value("name", &am.name)?;
    if am.normative_deadline.is_not_set() {
        return Err(ModelError::Validation("normativeDeadline is required".into()));
    }
    let needs_default = am.status.try_as_ref().map_or(true, |s| s.trim().is_empty());
    if needs_default {
        am.status = Set(DEFAULT_STATUS.into());
    }
    am.id = NotSet;
    am.created_at = Set(Utc::now().into());
    am.updated_at = Set(None);
    am.insert(db).await.map_err(errors::db_err)
}
