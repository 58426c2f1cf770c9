use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use tracing::{info, instrument};

use crate::auth::extractors::AdminAuth;
use crate::state::AppState;

use super::dto::StatsResponse;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(stats))
        .route("/admin/reset", post(reset))
}

#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>, _auth: AdminAuth) -> Json<StatsResponse> {
    let active_students = state.store.active_students_count().await;
    let total_students = state.store.get_students().await.len();
    let total_classes = state.store.get_classes().await.len();
    let total_attendance_records = state.store.get_attendance_records().await.len();
    Json(StatsResponse {
        active_students,
        total_students,
        total_classes,
        total_attendance_records,
    })
}

/// Wipe every collection. Development helper; the remote store refuses.
#[instrument(skip(state))]
pub async fn reset(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Result<StatusCode, (StatusCode, String)> {
    if !state.store.reset_data().await {
        return Err((
            StatusCode::CONFLICT,
            "Reset is not supported on this backend".into(),
        ));
    }
    info!("all collections reset");
    Ok(StatusCode::NO_CONTENT)
}
