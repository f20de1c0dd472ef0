use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use models::task::TaskStatus;
use service::auth::domain::Claims;
use service::tasks::domain::{TaskRequest, TaskView};
use service::tasks::service::today;
use service::tasks::stats::{StatusCounts, TrendPoint};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::auth::{viewer, ServerState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    #[param(value_type = String)]
    pub status: TaskStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DaysQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct PlannedDatesQuery {
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
}

#[utoipa::path(get, path = "/api/tasks", tag = "tasks", responses((status = 200, description = "Visible top-level tasks")))]
pub async fn list(State(state): State<ServerState>, Extension(claims): Extension<Claims>) -> Result<Json<Vec<TaskView>>, JsonApiError> {
    Ok(Json(state.tasks.list_tasks(viewer(&claims)).await?))
}

#[utoipa::path(post, path = "/api/tasks", tag = "tasks", request_body = crate::openapi::TaskRequestDoc, responses((status = 200, description = "Created"), (status = 400, description = "Validation Error")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> Result<Json<TaskView>, JsonApiError> {
    Ok(Json(state.tasks.create_task(req, claims.uid).await?))
}

#[utoipa::path(get, path = "/api/tasks/{id}", tag = "tasks", params(("id" = i64, Path, description = "Task id")), responses((status = 200, description = "Task"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Json<TaskView>, JsonApiError> {
    Ok(Json(state.tasks.get_task(id).await?))
}

#[utoipa::path(put, path = "/api/tasks/{id}", tag = "tasks", params(("id" = i64, Path, description = "Task id")), request_body = crate::openapi::TaskRequestDoc, responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> Result<Json<TaskView>, JsonApiError> {
    Ok(Json(state.tasks.update_task(id, req).await?))
}

#[utoipa::path(delete, path = "/api/tasks/{id}", tag = "tasks", params(("id" = i64, Path, description = "Task id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<StatusCode, JsonApiError> {
    state.tasks.delete_task(id, &state.files).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(put, path = "/api/tasks/{id}/status", tag = "tasks", params(("id" = i64, Path, description = "Task id"), StatusQuery), responses((status = 200, description = "Status changed")))]
pub async fn update_status(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(q): ApiQuery<StatusQuery>,
) -> Result<Json<TaskView>, JsonApiError> {
    Ok(Json(state.tasks.update_status(id, q.status, q.reason).await?))
}

#[utoipa::path(get, path = "/api/tasks/deadlines/upcoming", tag = "tasks", params(DaysQuery), responses((status = 200, description = "Tasks due soon")))]
pub async fn upcoming(State(state): State<ServerState>, ApiQuery(q): ApiQuery<DaysQuery>) -> Result<Json<Vec<TaskView>>, JsonApiError> {
    Ok(Json(state.tasks.upcoming_deadlines(today(), q.days).await?))
}

#[utoipa::path(get, path = "/api/tasks/stats", tag = "tasks", responses((status = 200, description = "Counts by status")))]
pub async fn stats(State(state): State<ServerState>, Extension(claims): Extension<Claims>) -> Result<Json<StatusCounts>, JsonApiError> {
    Ok(Json(state.tasks.stats(viewer(&claims), today()).await?))
}

#[utoipa::path(get, path = "/api/tasks/overdue", tag = "tasks", responses((status = 200, description = "Overdue tasks")))]
pub async fn overdue(State(state): State<ServerState>, Extension(claims): Extension<Claims>) -> Result<Json<Vec<TaskView>>, JsonApiError> {
    Ok(Json(state.tasks.overdue(viewer(&claims), today()).await?))
}

#[utoipa::path(get, path = "/api/tasks/unassigned", tag = "tasks", responses((status = 200, description = "Open tasks without assignee")))]
pub async fn unassigned(State(state): State<ServerState>) -> Result<Json<Vec<TaskView>>, JsonApiError> {
    Ok(Json(state.tasks.unassigned().await?))
}

#[utoipa::path(get, path = "/api/tasks/trend", tag = "tasks", params(DaysQuery), responses((status = 200, description = "Created/completed per day")))]
pub async fn trend(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    ApiQuery(q): ApiQuery<DaysQuery>,
) -> Result<Json<Vec<TrendPoint>>, JsonApiError> {
    Ok(Json(state.tasks.trend(viewer(&claims), today(), q.days).await?))
}

#[utoipa::path(get, path = "/api/tasks/{id}/subtasks", tag = "tasks", params(("id" = i64, Path, description = "Parent task id")), responses((status = 200, description = "Subtasks")))]
pub async fn subtasks(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Json<Vec<TaskView>>, JsonApiError> {
    Ok(Json(state.tasks.subtasks(id).await?))
}

#[utoipa::path(post, path = "/api/tasks/{id}/subtasks", tag = "tasks", params(("id" = i64, Path, description = "Parent task id")), request_body = crate::openapi::TaskRequestDoc, responses((status = 200, description = "Subtask created")))]
pub async fn create_subtask(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> Result<Json<TaskView>, JsonApiError> {
    Ok(Json(state.tasks.create_subtask(id, req, claims.uid).await?))
}

#[utoipa::path(put, path = "/api/tasks/{id}/planned-dates", tag = "tasks", params(("id" = i64, Path, description = "Task id"), PlannedDatesQuery), responses((status = 200, description = "Planned dates set"), (status = 400, description = "Start after end")))]
pub async fn planned_dates(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(q): ApiQuery<PlannedDatesQuery>,
) -> Result<Json<TaskView>, JsonApiError> {
    Ok(Json(state.tasks.update_planned_dates(id, q.planned_start_date, q.planned_end_date).await?))
}
