use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::Date;
use tracing::{info, instrument, warn};

use crate::auth::extractors::{AdminAuth, StudentAuth};
use crate::models::AttendanceRecord;
use crate::state::AppState;
use crate::store::DATE_FMT;

use super::dto::CheckInRequest;

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/attendance", post(check_in).get(all_attendance))
        .route("/attendance/:date", delete(check_out))
        .route("/attendance/me", get(my_attendance))
        .route("/attendance/by-date/:date", get(attendance_by_date))
}

#[instrument(skip(state, auth))]
pub async fn check_in(
    State(state): State<AppState>,
    auth: StudentAuth,
    Json(payload): Json<CheckInRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    validate_date(&payload.class_date)?;

    let ok = state
        .store
        .add_attendance_record(&auth.session.student_id, &payload.class_date)
        .await;
    if !ok {
        warn!(student_id = %auth.session.student_id, date = %payload.class_date, "check-in failed");
        return Err((
            StatusCode::CONFLICT,
            "Check-in failed: no class that day or already checked in".into(),
        ));
    }

    info!(student_id = %auth.session.student_id, date = %payload.class_date, "checked in");
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, auth))]
pub async fn check_out(
    State(state): State<AppState>,
    auth: StudentAuth,
    Path(date): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    validate_date(&date)?;

    let ok = state
        .store
        .remove_attendance_record(&auth.session.student_id, &date)
        .await;
    if !ok {
        // Covers both "no record" and backends that don't support removal.
        return Err((StatusCode::NOT_FOUND, "Nothing to cancel".into()));
    }

    info!(student_id = %auth.session.student_id, %date, "check-in cancelled");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, auth))]
pub async fn my_attendance(
    State(state): State<AppState>,
    auth: StudentAuth,
) -> Json<Vec<AttendanceRecord>> {
    Json(
        state
            .store
            .get_student_attendance_records(&auth.session.student_id)
            .await,
    )
}

/// Full attendance history, for the admin member-statistics screen.
#[instrument(skip(state))]
pub async fn all_attendance(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Json<Vec<AttendanceRecord>> {
    Json(state.store.get_attendance_records().await)
}

#[instrument(skip(state))]
pub async fn attendance_by_date(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(date): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>, (StatusCode, String)> {
    validate_date(&date)?;
    Ok(Json(state.store.get_attendance_by_date(&date).await))
}

fn validate_date(date: &str) -> Result<(), (StatusCode, String)> {
    Date::parse(date, &DATE_FMT)
        .map(|_| ())
        .map_err(|_| (StatusCode::BAD_REQUEST, "Date must be YYYY-MM-DD".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewClassSession;

    async fn logged_in_student(state: &AppState) -> StudentAuth {
        let student = state
            .store
            .validate_student_login("S001", "1234")
            .await
            .unwrap();
        let token = state
            .sessions
            .login_student(student.id.clone(), student.name.clone());
        let session = state.sessions.student(&token).unwrap();
        StudentAuth { token, session }
    }

    async fn add_class(state: &AppState, date: &str) {
        assert!(
            state
                .store
                .add_class(NewClassSession {
                    date: date.into(),
                    class_name: "X".into(),
                    start_time: "09:00".into(),
                    end_time: "10:00".into(),
                    announcement: None,
                })
                .await
        );
    }

    #[tokio::test]
    async fn check_in_then_cancel_round_trip() {
        let state = AppState::fake();
        add_class(&state, "2025-01-10").await;
        let auth = logged_in_student(&state).await;

        let created = check_in(
            State(state.clone()),
            StudentAuth {
                token: auth.token.clone(),
                session: auth.session.clone(),
            },
            Json(CheckInRequest {
                class_date: "2025-01-10".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(created, StatusCode::CREATED);

        let mine = my_attendance(
            State(state.clone()),
            StudentAuth {
                token: auth.token.clone(),
                session: auth.session.clone(),
            },
        )
        .await;
        assert_eq!(mine.0.len(), 1);
        assert_eq!(mine.0[0].class_date, "2025-01-10");

        let removed = check_out(State(state.clone()), auth, Path("2025-01-10".into()))
            .await
            .unwrap();
        assert_eq!(removed, StatusCode::NO_CONTENT);

        let class = state.store.get_class_by_date("2025-01-10").await.unwrap();
        assert_eq!(class.attendance_count, 0);
    }

    #[tokio::test]
    async fn double_check_in_conflicts() {
        let state = AppState::fake();
        add_class(&state, "2025-01-10").await;
        let auth = logged_in_student(&state).await;

        assert!(check_in(
            State(state.clone()),
            StudentAuth {
                token: auth.token.clone(),
                session: auth.session.clone(),
            },
            Json(CheckInRequest {
                class_date: "2025-01-10".into(),
            }),
        )
        .await
        .is_ok());

        let err = check_in(
            State(state),
            auth,
            Json(CheckInRequest {
                class_date: "2025-01-10".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn cancelling_without_a_record_is_not_found() {
        let state = AppState::fake();
        add_class(&state, "2025-01-10").await;
        let auth = logged_in_student(&state).await;

        let err = check_out(State(state), auth, Path("2025-01-10".into()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admin_sees_attendance_for_a_date() {
        let state = AppState::fake();
        add_class(&state, "2025-01-10").await;
        let auth = logged_in_student(&state).await;
        assert!(check_in(
            State(state.clone()),
            auth,
            Json(CheckInRequest {
                class_date: "2025-01-10".into(),
            }),
        )
        .await
        .is_ok());

        let records = attendance_by_date(State(state), AdminAuth, Path("2025-01-10".into()))
            .await
            .unwrap();
        assert_eq!(records.0.len(), 1);
        assert_eq!(records.0[0].student_name, "김철수");
    }
}
