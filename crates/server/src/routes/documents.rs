use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::Response,
    Extension, Json,
};
use tracing::{info, warn};

use service::auth::domain::Claims;
use service::document_service;

use crate::errors::JsonApiError;
use crate::extract::ApiPath;
use crate::routes::auth::ServerState;

/// One file part pulled out of a multipart body, plus any text fields seen.
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Read every part; `file_field` parts become files, the rest are text fields.
pub async fn read_multipart(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(Vec<UploadedFile>, Vec<(String, String)>), JsonApiError> {
    let mut files = Vec::new();
    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == file_field {
            let file_name = field.file_name().unwrap_or("file").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| JsonApiError::bad_request(format!("cannot read file: {e}")))?;
            files.push(UploadedFile { file_name, content_type, bytes: bytes.to_vec() });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| JsonApiError::bad_request(format!("cannot read field {name}: {e}")))?;
            fields.push((name, value));
        }
    }
    Ok((files, fields))
}

/// `Content-Disposition: attachment` response with the raw bytes.
pub fn attachment(file_name: &str, bytes: Vec<u8>) -> Result<Response, JsonApiError> {
    let safe = file_name.replace('"', "");
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_DISPOSITION, format!("attachment; filename=\"{safe}\""))
        .body(Body::from(bytes))
        .map_err(|e| {
            warn!(err = %e, "attachment response build failed");
            JsonApiError::internal()
        })
}

#[utoipa::path(post, path = "/api/tasks/{id}/documents", tag = "documents", params(("id" = i64, Path, description = "Task id")), responses((status = 200, description = "Uploaded"), (status = 400, description = "No file")))]
pub async fn upload(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    ApiPath(task_id): ApiPath<i64>,
    multipart: Multipart,
) -> Result<Json<models::document::Model>, JsonApiError> {
    let (files, _) = read_multipart(multipart, "file").await?;
    let Some(file) = files.into_iter().next() else {
        return Err(JsonApiError::bad_request("file part is required"));
    };
    let doc = document_service::upload_document(&state.db, &state.files, task_id, &file.file_name, &file.bytes, Some(claims.uid)).await?;
    Ok(Json(doc))
}

#[utoipa::path(get, path = "/api/tasks/{id}/documents", tag = "documents", params(("id" = i64, Path, description = "Task id")), responses((status = 200, description = "Documents of a task")))]
pub async fn list(State(state): State<ServerState>, ApiPath(task_id): ApiPath<i64>) -> Result<Json<Vec<models::document::Model>>, JsonApiError> {
    Ok(Json(document_service::list_documents(&state.db, task_id).await?))
}

#[utoipa::path(delete, path = "/api/documents/{id}", tag = "documents", params(("id" = i64, Path, description = "Document id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<StatusCode, JsonApiError> {
    document_service::delete_document(&state.db, &state.files, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/documents/{id}/download", tag = "documents", params(("id" = i64, Path, description = "Document id")), responses((status = 200, description = "File bytes"), (status = 404, description = "Not Found")))]
pub async fn download(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Response, JsonApiError> {
    let (doc, bytes) = document_service::download_document(&state.db, &state.files, id).await?;
    info!(document_id = id, size = bytes.len(), "document_download");
    attachment(&doc.file_name, bytes)
}
