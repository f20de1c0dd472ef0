use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::metrics;
use crate::openapi::ApiDoc;

pub mod admin;
pub mod auth;
pub mod dev;
pub mod documents;
pub mod egrn;
pub mod email;
pub mod geo;
pub mod payments;
pub mod regions;
pub mod stores;
pub mod tasks;
pub mod users;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

fn api_routes() -> Router<ServerState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/users", get(users::list))
        .route("/users/workload", get(users::workload))
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route("/tasks/deadlines/upcoming", get(tasks::upcoming))
        .route("/tasks/stats", get(tasks::stats))
        .route("/tasks/overdue", get(tasks::overdue))
        .route("/tasks/unassigned", get(tasks::unassigned))
        .route("/tasks/trend", get(tasks::trend))
        .route("/tasks/:id", get(tasks::get).put(tasks::update).delete(tasks::delete))
        .route("/tasks/:id/status", put(tasks::update_status))
        .route("/tasks/:id/subtasks", get(tasks::subtasks).post(tasks::create_subtask))
        .route("/tasks/:id/planned-dates", put(tasks::planned_dates))
        .route("/tasks/:id/documents", get(documents::list).post(documents::upload))
        .route("/documents/:id", axum::routing::delete(documents::delete))
        .route("/documents/:id/download", get(documents::download))
        .route("/references/stores", get(stores::list).post(stores::create))
        .route("/references/stores/license-stats", get(stores::license_stats))
        .route("/references/stores/:id", get(stores::get).put(stores::update).delete(stores::delete))
        .route("/regions", get(regions::list).post(regions::create))
        .route("/regions/search", get(regions::search))
        .route("/regions/by-license-type", get(regions::by_license_type))
        .route("/regions/:id", get(regions::get).put(regions::update).delete(regions::delete))
        .route("/payments", get(payments::list).post(payments::create))
        .route("/payments/task/:task_id", get(payments::by_task))
        .route("/payments/:id", get(payments::get))
        .route("/payments/:id/status", put(payments::update_status))
        .route("/egrn-extracts", get(egrn::list).post(egrn::create))
        .route("/egrn-extracts/:id", get(egrn::get))
        .route("/email/send", post(email::send))
        .route("/email/send-multipart", post(email::send_multipart))
        .route("/admin/renewal/run", post(admin::run_renewal))
        .route("/geo/geocode", get(geo::geocode))
        .route("/geo/stores/:id/nearby", get(geo::nearby))
        .nest("/dev", dev_routes())
}

fn dev_routes() -> Router<ServerState> {
    use axum::routing::patch;
    Router::new()
        .route("/stores", get(dev::list_stores).post(dev::create_store))
        .route("/stores/:id", get(dev::get_store).put(dev::update_store).delete(dev::delete_store))
        .route("/projects", get(dev::list_projects).post(dev::create_project))
        .route("/projects/:id", get(dev::get_project).put(dev::update_project).delete(dev::delete_project))
        .route("/projects/:id/status", patch(dev::update_project_status))
        .route("/projects/:id/gantt", get(dev::project_gantt))
        .route("/tasks", get(dev::list_tasks).post(dev::create_task))
        .route("/tasks/project/:id", get(dev::list_project_tasks))
        .route("/tasks/:id", get(dev::get_task).put(dev::update_task))
        .route("/tasks/:id/status", patch(dev::update_task_status))
        .route("/documents/upload", post(dev::upload_document))
        .route("/documents/project/:id", get(dev::list_documents))
        .route("/documents/download/:id", get(dev::download_document))
        .route("/documents/:id", axum::routing::delete(dev::delete_document))
}

/// Build the full application router: public routes, the bearer-protected API and docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let body_limit = state.config.storage.max_upload_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/api", api_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(middleware::from_fn(metrics::track))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
