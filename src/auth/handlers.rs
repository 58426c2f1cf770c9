use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum::extract::State;
use tracing::{info, instrument, warn};

use crate::models::NewStudent;
use crate::state::AppState;

use super::dto::{
    AdminLoginRequest, AdminLoginResponse, SignupRequest, StudentLoginRequest,
    StudentLoginResponse,
};
use super::extractors::{AdminAuth, StudentAuth};
use super::sessions::StudentSession;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/student/login", post(student_login))
        .route("/auth/student/signup", post(student_signup))
        .route("/auth/student/logout", post(student_logout))
        .route("/auth/student/me", get(student_me))
        .route("/auth/admin/login", post(admin_login))
        .route("/auth/admin/logout", post(admin_logout))
}

#[instrument(skip(state, payload))]
pub async fn student_login(
    State(state): State<AppState>,
    Json(payload): Json<StudentLoginRequest>,
) -> Result<Json<StudentLoginResponse>, (StatusCode, String)> {
    let student = match state
        .store
        .validate_student_login(&payload.student_id, &payload.password)
        .await
    {
        Some(student) => student,
        None => {
            warn!(student_id = %payload.student_id, "student login rejected");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
    };

    let token = state
        .sessions
        .login_student(student.id.clone(), student.name.clone());

    info!(student_id = %student.student_id, "student logged in");
    Ok(Json(StudentLoginResponse {
        token,
        student: student.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn student_signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    if payload.student_id.trim().is_empty()
        || payload.name.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err((
            StatusCode::BAD_REQUEST,
            "Student ID, name and password are required".into(),
        ));
    }

    let created = state
        .store
        .add_student(NewStudent {
            name: payload.name.trim().to_string(),
            student_id: payload.student_id.trim().to_string(),
            password: Some(payload.password),
            active: true,
        })
        .await;

    if !created {
        return Err((
            StatusCode::CONFLICT,
            "Student ID already registered".into(),
        ));
    }

    info!(student_id = %payload.student_id, "student signed up");
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, auth))]
pub async fn student_logout(State(state): State<AppState>, auth: StudentAuth) -> StatusCode {
    state.sessions.logout_student(&auth.token);
    info!(student_id = %auth.session.student_id, "student logged out");
    StatusCode::NO_CONTENT
}

#[instrument(skip(auth))]
pub async fn student_me(auth: StudentAuth) -> Json<StudentSession> {
    Json(auth.session)
}

#[instrument(skip(state, payload))]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, (StatusCode, String)> {
    match state.sessions.login_admin(&payload.id, &payload.password) {
        Some(token) => {
            info!("admin logged in");
            Ok(Json(AdminLoginResponse {
                token: token.to_string(),
            }))
        }
        None => {
            warn!("admin login rejected");
            Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()))
        }
    }
}

#[instrument(skip(state))]
pub async fn admin_logout(State(state): State<AppState>, _auth: AdminAuth) -> StatusCode {
    state.sessions.logout_admin();
    info!("admin logged out");
    StatusCode::NO_CONTENT
}
