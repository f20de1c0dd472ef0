//! Development portal: new-store projects, their tasks, documents and Gantt view.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
    Json,
};

use models::{dev_store, project_document, project_task};
use service::development::gantt::{self, Timeline};
use service::development::projects::{self, ProjectRequest, ProjectView};
use service::development::stores::{self, DevStoreRequest};
use service::development::tasks::{self, ProjectTaskRequest};
use service::development::documents;
use service::storage::file_store::extension_of;
use service::tasks::service::today;

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::routes::auth::ServerState;
use crate::routes::documents::{attachment, read_multipart};

#[utoipa::path(get, path = "/api/dev/stores", tag = "dev", responses((status = 200, description = "Development stores")))]
pub async fn list_stores(State(state): State<ServerState>) -> Result<Json<Vec<dev_store::Model>>, JsonApiError> {
    Ok(Json(stores::list_dev_stores(&state.db).await?))
}

#[utoipa::path(get, path = "/api/dev/stores/{id}", tag = "dev", params(("id" = i64, Path, description = "Store id")), responses((status = 200, description = "Store"), (status = 404, description = "Not Found")))]
pub async fn get_store(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Json<dev_store::Model>, JsonApiError> {
    Ok(Json(stores::get_dev_store(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/dev/stores", tag = "dev", responses((status = 200, description = "Created"), (status = 409, description = "Code already used")))]
pub async fn create_store(State(state): State<ServerState>, ApiJson(req): ApiJson<DevStoreRequest>) -> Result<Json<dev_store::Model>, JsonApiError> {
    Ok(Json(stores::create_dev_store(&state.db, req).await?))
}

#[utoipa::path(put, path = "/api/dev/stores/{id}", tag = "dev", params(("id" = i64, Path, description = "Store id")), responses((status = 200, description = "Updated")))]
pub async fn update_store(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<DevStoreRequest>,
) -> Result<Json<dev_store::Model>, JsonApiError> {
    Ok(Json(stores::update_dev_store(&state.db, id, req).await?))
}

#[utoipa::path(delete, path = "/api/dev/stores/{id}", tag = "dev", params(("id" = i64, Path, description = "Store id")), responses((status = 204, description = "Deleted")))]
pub async fn delete_store(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<StatusCode, JsonApiError> {
    stores::delete_dev_store(&state.db, &state.files, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/dev/projects", tag = "dev", responses((status = 200, description = "Projects with their stores")))]
pub async fn list_projects(State(state): State<ServerState>) -> Result<Json<Vec<ProjectView>>, JsonApiError> {
    Ok(Json(projects::list_projects(&state.db).await?))
}

#[utoipa::path(get, path = "/api/dev/projects/{id}", tag = "dev", params(("id" = i64, Path, description = "Project id")), responses((status = 200, description = "Project"), (status = 404, description = "Not Found")))]
pub async fn get_project(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Json<ProjectView>, JsonApiError> {
    Ok(Json(projects::get_project(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/dev/projects", tag = "dev", responses((status = 200, description = "Created"), (status = 400, description = "Unknown store")))]
pub async fn create_project(State(state): State<ServerState>, ApiJson(req): ApiJson<ProjectRequest>) -> Result<Json<ProjectView>, JsonApiError> {
    Ok(Json(projects::create_project(&state.db, req).await?))
}

#[utoipa::path(put, path = "/api/dev/projects/{id}", tag = "dev", params(("id" = i64, Path, description = "Project id")), responses((status = 200, description = "Updated")))]
pub async fn update_project(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<ProjectRequest>,
) -> Result<Json<ProjectView>, JsonApiError> {
    Ok(Json(projects::update_project(&state.db, id, req).await?))
}

/// Body is a bare JSON string, e.g. `"В работе"`.
#[utoipa::path(patch, path = "/api/dev/projects/{id}/status", tag = "dev", params(("id" = i64, Path, description = "Project id")), request_body = String, responses((status = 200, description = "Status changed")))]
pub async fn update_project_status(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(status): ApiJson<String>,
) -> Result<Json<ProjectView>, JsonApiError> {
    Ok(Json(projects::update_project_status(&state.db, id, &status).await?))
}

#[utoipa::path(delete, path = "/api/dev/projects/{id}", tag = "dev", params(("id" = i64, Path, description = "Project id")), responses((status = 204, description = "Deleted")))]
pub async fn delete_project(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<StatusCode, JsonApiError> {
    projects::delete_project(&state.db, &state.files, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/dev/projects/{id}/gantt", tag = "dev", params(("id" = i64, Path, description = "Project id")), responses((status = 200, description = "Gantt timeline")))]
pub async fn project_gantt(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Json<Timeline>, JsonApiError> {
    projects::get_project(&state.db, id).await?;
    let items = tasks::list_project_tasks(&state.db, id).await?;
    Ok(Json(gantt::timeline(&items, today())))
}

#[utoipa::path(get, path = "/api/dev/tasks", tag = "dev", responses((status = 200, description = "All project tasks")))]
pub async fn list_tasks(State(state): State<ServerState>) -> Result<Json<Vec<project_task::Model>>, JsonApiError> {
    Ok(Json(tasks::list_all_tasks(&state.db).await?))
}

#[utoipa::path(get, path = "/api/dev/tasks/project/{id}", tag = "dev", params(("id" = i64, Path, description = "Project id")), responses((status = 200, description = "Tasks of a project")))]
pub async fn list_project_tasks(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Json<Vec<project_task::Model>>, JsonApiError> {
    Ok(Json(tasks::list_project_tasks(&state.db, id).await?))
}

#[utoipa::path(get, path = "/api/dev/tasks/{id}", tag = "dev", params(("id" = i64, Path, description = "Task id")), responses((status = 200, description = "Task"), (status = 404, description = "Not Found")))]
pub async fn get_task(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Json<project_task::Model>, JsonApiError> {
    Ok(Json(tasks::get_project_task(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/dev/tasks", tag = "dev", responses((status = 200, description = "Created with type defaults"), (status = 400, description = "Unknown project")))]
pub async fn create_task(State(state): State<ServerState>, ApiJson(req): ApiJson<ProjectTaskRequest>) -> Result<Json<project_task::Model>, JsonApiError> {
    Ok(Json(tasks::create_project_task(&state.db, req, today()).await?))
}

#[utoipa::path(put, path = "/api/dev/tasks/{id}", tag = "dev", params(("id" = i64, Path, description = "Task id")), responses((status = 200, description = "Updated")))]
pub async fn update_task(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<ProjectTaskRequest>,
) -> Result<Json<project_task::Model>, JsonApiError> {
    Ok(Json(tasks::update_project_task(&state.db, id, req).await?))
}

#[utoipa::path(patch, path = "/api/dev/tasks/{id}/status", tag = "dev", params(("id" = i64, Path, description = "Task id")), request_body = String, responses((status = 200, description = "Status changed")))]
pub async fn update_task_status(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(status): ApiJson<String>,
) -> Result<Json<project_task::Model>, JsonApiError> {
    Ok(Json(tasks::update_project_task_status(&state.db, id, &status).await?))
}

/// Multipart form with `projectId`, `file` and an optional `type`.
#[utoipa::path(post, path = "/api/dev/documents/upload", tag = "dev", responses((status = 200, description = "Uploaded"), (status = 400, description = "Missing field")))]
pub async fn upload_document(State(state): State<ServerState>, multipart: Multipart) -> Result<Json<project_document::Model>, JsonApiError> {
    let (files, fields) = read_multipart(multipart, "file").await?;
    let project_id = fields
        .iter()
        .find(|(k, _)| k == "projectId")
        .and_then(|(_, v)| v.trim().parse::<i64>().ok())
        .ok_or_else(|| JsonApiError::bad_request("projectId is required"))?;
    let Some(file) = files.into_iter().next() else {
        return Err(JsonApiError::bad_request("file part is required"));
    };
    let doc_type = fields
        .iter()
        .find(|(k, _)| k == "type")
        .map(|(_, v)| v.clone())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| extension_of(&file.file_name));
    let doc = documents::upload_project_document(&state.db, &state.files, project_id, &file.file_name, Some(&doc_type), &file.bytes).await?;
    Ok(Json(doc))
}

#[utoipa::path(get, path = "/api/dev/documents/project/{id}", tag = "dev", params(("id" = i64, Path, description = "Project id")), responses((status = 200, description = "Documents of a project")))]
pub async fn list_documents(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Json<Vec<project_document::Model>>, JsonApiError> {
    Ok(Json(documents::list_project_documents(&state.db, id).await?))
}

#[utoipa::path(get, path = "/api/dev/documents/download/{id}", tag = "dev", params(("id" = i64, Path, description = "Document id")), responses((status = 200, description = "File bytes"), (status = 404, description = "Not Found")))]
pub async fn download_document(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Response, JsonApiError> {
    let (doc, bytes) = documents::download_project_document(&state.db, &state.files, id).await?;
    attachment(&doc.name, bytes)
}

#[utoipa::path(delete, path = "/api/dev/documents/{id}", tag = "dev", params(("id" = i64, Path, description = "Document id")), responses((status = 204, description = "Deleted")))]
pub async fn delete_document(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<StatusCode, JsonApiError> {
    documents::delete_project_document(&state.db, &state.files, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
