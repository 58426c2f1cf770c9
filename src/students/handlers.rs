use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::auth::dto::PublicStudent;
use crate::auth::extractors::AdminAuth;
use crate::models::NewStudent;
use crate::state::AppState;

use super::dto::CreateStudentRequest;

pub fn student_routes() -> Router<AppState> {
    Router::new().route("/students", get(list_students).post(create_student))
}

/// Roster view for the admin screens.
#[instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Json<Vec<PublicStudent>> {
    let students = state.store.get_students().await;
    Json(students.into_iter().map(PublicStudent::from).collect())
}

#[instrument(skip(state, payload))]
pub async fn create_student(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    if payload.student_id.trim().is_empty() || payload.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Student ID and name are required".into(),
        ));
    }

    let created = state
        .store
        .add_student(NewStudent {
            name: payload.name.trim().to_string(),
            student_id: payload.student_id.trim().to_string(),
            password: payload.password,
            active: payload.active.unwrap_or(true),
        })
        .await;

    if !created {
        return Err((
            StatusCode::CONFLICT,
            "Student ID already registered".into(),
        ));
    }

    info!(student_id = %payload.student_id, "student added to roster");
    Ok(StatusCode::CREATED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn admin_can_add_and_list_students() {
        let state = AppState::fake();
        let created = create_student(
            State(state.clone()),
            AdminAuth,
            Json(CreateStudentRequest {
                name: "Kim".into(),
                student_id: "S099".into(),
                password: None,
                active: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(created, StatusCode::CREATED);

        let roster = list_students(State(state), AdminAuth).await;
        assert!(roster.0.iter().any(|s| s.student_id == "S099" && s.active));
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let state = AppState::fake();
        let err = create_student(
            State(state),
            AdminAuth,
            Json(CreateStudentRequest {
                name: "  ".into(),
                student_id: "S100".into(),
                password: None,
                active: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
