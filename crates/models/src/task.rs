use chrono::{NaiveDate, Utc};
use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseType {
    #[sea_orm(string_value = "ALCOHOL")]
    Alcohol,
    #[sea_orm(string_value = "TOBACCO")]
    Tobacco,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    #[sea_orm(string_value = "NEW")]
    New,
    #[sea_orm(string_value = "RENEWAL")]
    Renewal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[sea_orm(string_value = "ASSIGNED")]
    Assigned,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "SUSPENDED")]
    Suspended,
    #[sea_orm(string_value = "DONE")]
    Done,
}

impl TaskStatus {
    /// Statuses of a task that is still being worked on.
    pub const ACTIVE: [TaskStatus; 3] = [TaskStatus::Assigned, TaskStatus::InProgress, TaskStatus::Suspended];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubtaskType {
    #[sea_orm(string_value = "GIS_ANALYSIS")]
    GisAnalysis,
    #[sea_orm(string_value = "DOCUMENT_UPLOAD")]
    DocumentUpload,
    #[sea_orm(string_value = "STATE_FEE_PAYMENT")]
    StateFeePayment,
    #[sea_orm(string_value = "EGRN_REQUEST")]
    EgrnRequest,
    #[sea_orm(string_value = "FIAS_ADDRESS_CHECK")]
    FiasAddressCheck,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub license_type: LicenseType,
    pub action_type: ActionType,
    pub status: TaskStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub status_reason: Option<String>,
    pub store_id: Option<i64>,
    pub assignee_id: Option<i64>,
    pub created_by_id: Option<i64>,
    pub deadline_date: Option<Date>,
    pub parent_task_id: Option<i64>,
    pub subtask_type: Option<SubtaskType>,
    pub planned_start_date: Option<Date>,
    pub planned_end_date: Option<Date>,
    pub actual_start_date: Option<Date>,
    pub actual_end_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Store,
    Assignee,
    CreatedBy,
    Parent,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Store => Entity::belongs_to(crate::store::Entity)
                .from(Column::StoreId)
                .to(crate::store::Column::Id)
                .into(),
            Relation::Assignee => Entity::belongs_to(crate::user::Entity)
                .from(Column::AssigneeId)
                .to(crate::user::Column::Id)
                .into(),
            Relation::CreatedBy => Entity::belongs_to(crate::user::Entity)
                .from(Column::CreatedById)
                .to(crate::user::Column::Id)
                .into(),
            Relation::Parent => Entity::belongs_to(Entity)
                .from(Column::ParentTaskId)
                .to(Column::Id)
                .into(),
        }
    }
}

impl Related<crate::store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Store.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_done() && self.deadline_date.is_some_and(|d| d < today)
    }
}

pub fn validate_planned_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ModelError> {
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(ModelError::Validation("planned start date must not be after planned end date".into()));
        }
    }
    Ok(())
}

/// Insert a task. Status defaults to `ASSIGNED` when not set.
pub async fn create(db: &DatabaseConnection, mut am: ActiveModel) -> Result<Model, ModelError> {
    errors::required_value("title", &am.title)?;
    if am.license_type.is_not_set() || am.action_type.is_not_set() {
        return Err(ModelError::Validation("licenseType and actionType are required".into()));
    }
    let start = am.planned_start_date.try_as_ref().copied().flatten();
    let end = am.planned_end_date.try_as_ref().copied().flatten();
    validate_planned_dates(start, end)?;
    if am.status.is_not_set() {
        am.status = Set(TaskStatus::Assigned);
    }
    am.id = NotSet;
    am.created_at = Set(Utc::now().into());
    am.updated_at = Set(None);
    am.insert(db).await.map_err(errors::db_err)
}
