use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    #[sea_orm(string_value = "UPLOADED")]
    Uploaded,
    #[sea_orm(string_value = "VERIFIED")]
    Verified,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub document_type: String,
    pub file_name: String,
    #[serde(skip_serializing)]
    pub file_path: String,
    pub file_size: i64,
    pub status: DocumentStatus,
    pub uploaded_by_id: Option<i64>,
    pub upload_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Task,
    UploadedBy,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Task => Entity::belongs_to(crate::task::Entity)
                .from(Column::TaskId)
                .to(crate::task::Column::Id)
                .into(),
            Relation::UploadedBy => Entity::belongs_to(crate::user::Entity)
                .from(Column::UploadedById)
                .to(crate::user::Column::Id)
                .into(),
        }
    }
}

impl Related<crate::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(
    db: &DatabaseConnection,
    task_id: i64,
    file_name: &str,
    file_path: &str,
    file_size: i64,
    document_type: &str,
    uploaded_by_id: Option<i64>,
) -> Result<Model, ModelError> {
    errors::required("fileName", file_name)?;
    errors::required("filePath", file_path)?;
    let am = ActiveModel {
        id: NotSet,
        task_id: Set(task_id),
        document_type: Set(document_type.to_string()),
        file_name: Set(file_name.to_string()),
        file_path: Set(file_path.to_string()),
        file_size: Set(file_size),
        status: Set(DocumentStatus::Uploaded),
        uploaded_by_id: Set(uploaded_by_id),
        upload_date: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(errors::db_err)
}
