use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::{project, project_task};

use crate::errors::ServiceError;

pub const DEFAULT_DEADLINE_DAYS: i64 = 14;

/// Responsible role and normative duration for a task type.
pub fn task_defaults(task_type: &str) -> (Option<&'static str>, i64) {
    match task_type.trim() {
        "Планирование аудита" => (Some("НОР"), 7),
        "Согласование контура" => (Some("МП"), 14),
        "Расчет бюджета" => (Some("СтМРиЗ"), 21),
        _ => (None, DEFAULT_DEADLINE_DAYS),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTaskRequest {
    pub project_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub task_type: String,
    pub responsible: Option<String>,
    pub normative_deadline: Option<NaiveDate>,
    pub actual_date: Option<NaiveDate>,
    pub status: Option<String>,
}

/// Fill responsible and deadline from the task type where the request leaves them out.
pub fn resolve_defaults(req: &ProjectTaskRequest, today: NaiveDate) -> (String, NaiveDate) {
    let (responsible, days) = task_defaults(&req.task_type);
    let responsible = req
        .responsible
        .clone()
        .filter(|r| !r.trim().is_empty())
        .or(responsible.map(str::to_string))
        .unwrap_or_default();
    let deadline = req.normative_deadline.unwrap_or(today + Duration::days(days));
    (responsible, deadline)
}

pub async fn list_all_tasks(db: &DatabaseConnection) -> Result<Vec<project_task::Model>, ServiceError> {
    Ok(project_task::Entity::find().order_by_asc(project_task::Column::NormativeDeadline).all(db).await?)
}

pub async fn list_project_tasks(db: &DatabaseConnection, project_id: i64) -> Result<Vec<project_task::Model>, ServiceError> {
    Ok(project_task::Entity::find()
        .filter(project_task::Column::ProjectId.eq(project_id))
        .order_by_asc(project_task::Column::NormativeDeadline)
        .all(db)
        .await?)
}

pub async fn get_project_task(db: &DatabaseConnection, id: i64) -> Result<project_task::Model, ServiceError> {
    project_task::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("task"))
}

#[instrument(skip(db, req), fields(project_id = req.project_id, task_type = %req.task_type))]
pub async fn create_project_task(
    db: &DatabaseConnection,
    req: ProjectTaskRequest,
    today: NaiveDate,
) -> Result<project_task::Model, ServiceError> {
    if project::Entity::find_by_id(req.project_id).count(db).await? == 0 {
        return Err(ServiceError::Validation(format!("project {} does not exist", req.project_id)));
    }
    let (responsible, deadline) = resolve_defaults(&req, today);
    let am = project_task::ActiveModel {
        project_id: Set(req.project_id),
        name: Set(req.name.trim().to_string()),
        task_type: Set(req.task_type.trim().to_string()),
        responsible: Set(responsible),
        normative_deadline: Set(deadline),
        actual_date: Set(req.actual_date),
        status: req.status.map(Set).unwrap_or_default(),
        ..Default::default()
    };
    let created = project_task::create(db, am).await?;
    info!(task_id = created.id, "project_task_created");
    Ok(created)
}

#[instrument(skip(db, req))]
pub async fn update_project_task(
    db: &DatabaseConnection,
    id: i64,
    req: ProjectTaskRequest,
) -> Result<project_task::Model, ServiceError> {
    if req.name.trim().is_empty() {
        return Err(ServiceError::Validation("name is required".into()));
    }
    let existing = get_project_task(db, id).await?;
    let mut am: project_task::ActiveModel = existing.clone().into();
    am.name = Set(req.name.trim().to_string());
    if !req.task_type.trim().is_empty() {
        am.task_type = Set(req.task_type.trim().to_string());
    }
    if let Some(r) = req.responsible.filter(|r| !r.trim().is_empty()) {
        am.responsible = Set(r);
    }
    if let Some(d) = req.normative_deadline {
        am.normative_deadline = Set(d);
    }
    am.actual_date = Set(req.actual_date);
    if let Some(s) = req.status.filter(|s| !s.trim().is_empty()) {
        am.status = Set(s);
    }
    am.updated_at = Set(Some(Utc::now().into()));
    let updated = am.update(db).await?;
    info!(task_id = id, "project_task_updated");
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn update_project_task_status(db: &DatabaseConnection, id: i64, status: &str) -> Result<project_task::Model, ServiceError> {
    let status = status.trim();
    if status.is_empty() {
        return Err(ServiceError::Validation("status is required".into()));
    }
    let mut am: project_task::ActiveModel = get_project_task(db, id).await?.into();
    am.status = Set(status.to_string());
    am.updated_at = Set(Some(Utc::now().into()));
    let updated = am.update(db).await?;
    info!(task_id = id, status, "project_task_status_changed");
    Ok(updated)
}
