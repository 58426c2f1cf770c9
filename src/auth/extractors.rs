use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use tracing::warn;

use super::sessions::{Sessions, StudentSession};

fn bearer(parts: &Parts) -> Result<&str, (StatusCode, String)> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing Authorization header".to_string(),
        ))?;
    header.strip_prefix("Bearer ").ok_or((
        StatusCode::UNAUTHORIZED,
        "Invalid Authorization header".to_string(),
    ))
}

/// Route guard for student screens: resolves the bearer token against the
/// session registry.
#[derive(Debug)]
pub struct StudentAuth {
    pub token: String,
    pub session: StudentSession,
}

#[async_trait]
impl<S> FromRequestParts<S> for StudentAuth
where
    S: Send + Sync,
    Arc<Sessions>: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = Arc::<Sessions>::from_ref(state);
        let token = bearer(parts)?;
        match sessions.student(token) {
            Some(session) => Ok(StudentAuth {
                token: token.to_string(),
                session,
            }),
            None => {
                warn!("unknown or expired student session token");
                Err((StatusCode::UNAUTHORIZED, "Not logged in".to_string()))
            }
        }
    }
}

/// Route guard for admin screens: accepts only the fixed admin token while
/// the admin session is active.
#[derive(Debug)]
pub struct AdminAuth;

#[async_trait]
impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
    Arc<Sessions>: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = Arc::<Sessions>::from_ref(state);
        let token = bearer(parts)?;
        if sessions.admin_token_valid(token) {
            Ok(AdminAuth)
        } else {
            warn!("invalid admin token");
            Err((StatusCode::UNAUTHORIZED, "Admin login required".to_string()))
        }
    }
}
