use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::AuthUser, dashboard::dto::DashboardResponse, dashboard::services, error::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(dashboard_stats))
}

#[instrument(skip(state))]
async fn dashboard_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    Ok(Json(services::build_dashboard(&state.db, user_id).await?))
}
