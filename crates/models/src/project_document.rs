use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_document")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub doc_type: Option<String>,
    #[serde(skip_serializing)]
    pub file_path: String,
    pub size: i64,
    pub uploaded_at: DateTimeWithTimeZone,
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

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(
    db: &DatabaseConnection,
    project_id: i64,
    name: &str,
    doc_type: Option<&str>,
    file_path: &str,
    size: i64,
) -> Result<Model, ModelError> {
    errors::required("name", name)?;
    let am = ActiveModel {
        id: NotSet,
        project_id: Set(project_id),
        name: Set(name.to_string()),
        doc_type: Set(doc_type.map(str::to_string)),
        file_path: Set(file_path.to_string()),
        size: Set(size),
        uploaded_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(errors::db_err)
}
