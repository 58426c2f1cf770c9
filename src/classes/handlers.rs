use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::Date;
use tracing::{info, instrument, warn};

use crate::auth::extractors::AdminAuth;
use crate::models::ClassSession;
use crate::state::AppState;
use crate::store::DATE_FMT;

use super::dto::CreateClassRequest;

pub fn class_routes() -> Router<AppState> {
    Router::new()
        .route("/classes", get(list_classes).post(create_class))
        .route("/classes/:date", get(get_class))
}

// Calendar data is readable without a session; only creation is gated.

#[instrument(skip(state))]
pub async fn list_classes(State(state): State<AppState>) -> Json<Vec<ClassSession>> {
    Json(state.store.get_classes().await)
}

#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<ClassSession>, (StatusCode, String)> {
    validate_date(&date)?;
    match state.store.get_class_by_date(&date).await {
        Some(class) => Ok(Json(class)),
        None => Err((StatusCode::NOT_FOUND, "No class on that date".into())),
    }
}

#[instrument(skip(state, payload))]
pub async fn create_class(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Json(payload): Json<CreateClassRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    validate_date(&payload.date)?;
    if payload.class_name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Class name is required".into()));
    }

    let date = payload.date.clone();
    if !state.store.add_class(payload.into()).await {
        warn!(%date, "class creation rejected");
        return Err((
            StatusCode::CONFLICT,
            "A class already exists for that date".into(),
        ));
    }

    info!(%date, "class created");
    Ok(StatusCode::CREATED)
}

fn validate_date(date: &str) -> Result<(), (StatusCode, String)> {
    Date::parse(date, &DATE_FMT)
        .map(|_| ())
        .map_err(|_| (StatusCode::BAD_REQUEST, "Date must be YYYY-MM-DD".into()))
}
