use axum::{extract::State, Extension, Json};

use service::auth::domain::Claims;
use service::renewal::{self, RenewalReport};
use service::tasks::service::today;

use crate::errors::JsonApiError;
use crate::routes::auth::{require_admin, ServerState};

/// Run the renewal planner immediately instead of waiting for the daily tick.
#[utoipa::path(post, path = "/api/admin/renewal/run", tag = "admin", responses((status = 200, description = "Renewal tasks created"), (status = 403, description = "Forbidden")))]
pub async fn run_renewal(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<RenewalReport>, JsonApiError> {
    require_admin(&claims)?;
    Ok(Json(renewal::run_once(&state.db, &state.config.renewal, today()).await?))
}
