use axum::{
    extract::State,
    Json,
};
use serde::Deserialize;

use models::payment::PaymentStatus;
use service::payment_service::{self, PaymentRequest, PaymentView};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: PaymentStatus,
}

#[utoipa::path(get, path = "/api/payments", tag = "payments", responses((status = 200, description = "Payments")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<PaymentView>>, JsonApiError> {
    Ok(Json(payment_service::list_payments(&state.db).await?))
}

#[utoipa::path(post, path = "/api/payments", tag = "payments", request_body = crate::openapi::PaymentRequestDoc, responses((status = 200, description = "Created"), (status = 400, description = "Validation Error")))]
pub async fn create(State(state): State<ServerState>, ApiJson(req): ApiJson<PaymentRequest>) -> Result<Json<PaymentView>, JsonApiError> {
    Ok(Json(payment_service::create_payment(&state.db, req).await?))
}

#[utoipa::path(get, path = "/api/payments/{id}", tag = "payments", params(("id" = i64, Path, description = "Payment id")), responses((status = 200, description = "Payment"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Json<PaymentView>, JsonApiError> {
    Ok(Json(payment_service::get_payment(&state.db, id).await?))
}

#[utoipa::path(get, path = "/api/payments/task/{taskId}", tag = "payments", params(("taskId" = i64, Path, description = "Task id")), responses((status = 200, description = "Payments of a task")))]
pub async fn by_task(State(state): State<ServerState>, ApiPath(task_id): ApiPath<i64>) -> Result<Json<Vec<PaymentView>>, JsonApiError> {
    Ok(Json(payment_service::payments_by_task(&state.db, task_id).await?))
}

#[utoipa::path(put, path = "/api/payments/{id}/status", tag = "payments", params(("id" = i64, Path, description = "Payment id")), responses((status = 200, description = "Status changed")))]
pub async fn update_status(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<StatusBody>,
) -> Result<Json<PaymentView>, JsonApiError> {
    Ok(Json(payment_service::update_payment_status(&state.db, id, body.status).await?))
}
