//! Explicit session registry.
//!
//! Sessions are ephemeral process state, never persisted: a token is minted
//! on login, looked up by the route guards, and removed on logout. The admin
//! session is a single fixed token behind a hardcoded credential pair — it is
//! not data-backed and there is deliberately no hashing anywhere here.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use uuid::Uuid;

pub const ADMIN_HANDLE: &str = "admin";
pub const ADMIN_PASSWORD: &str = "1234";
pub const ADMIN_TOKEN: &str = "dummy-token";

/// The authenticated student's identity, as captured at login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSession {
    pub student_id: String,
    pub student_name: String,
}

#[derive(Default)]
pub struct Sessions {
    students: Mutex<HashMap<String, StudentSession>>,
    admin_active: AtomicBool,
}

impl Sessions {
    /// Create a student session and return its bearer token.
    pub fn login_student(&self, student_id: String, student_name: String) -> String {
        let token = Uuid::new_v4().to_string();
        self.lock_students().insert(
            token.clone(),
            StudentSession {
                student_id,
                student_name,
            },
        );
        token
    }

    pub fn student(&self, token: &str) -> Option<StudentSession> {
        self.lock_students().get(token).cloned()
    }

    /// Destroy a student session. Returns whether the token was known.
    pub fn logout_student(&self, token: &str) -> bool {
        self.lock_students().remove(token).is_some()
    }

    /// Check the fixed admin credential pair; on match, activate the admin
    /// session and hand back its fixed token.
    pub fn login_admin(&self, handle: &str, password: &str) -> Option<&'static str> {
        if handle == ADMIN_HANDLE && password == ADMIN_PASSWORD {
            self.admin_active.store(true, Ordering::Relaxed);
            Some(ADMIN_TOKEN)
        } else {
            None
        }
    }

    pub fn admin_token_valid(&self, token: &str) -> bool {
        token == ADMIN_TOKEN && self.admin_active.load(Ordering::Relaxed)
    }

    pub fn logout_admin(&self) {
        self.admin_active.store(false, Ordering::Relaxed);
    }

    fn lock_students(&self) -> std::sync::MutexGuard<'_, HashMap<String, StudentSession>> {
        self.students.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_session_lifecycle() {
        let sessions = Sessions::default();
        let token = sessions.login_student("S001".into(), "김철수".into());

        let session = sessions.student(&token).unwrap();
        assert_eq!(session.student_id, "S001");
        assert_eq!(session.student_name, "김철수");
        assert!(sessions.student("other-token").is_none());

        assert!(sessions.logout_student(&token));
        assert!(sessions.student(&token).is_none());
        assert!(!sessions.logout_student(&token));
    }

    #[test]
    fn admin_session_requires_fixed_credentials() {
        let sessions = Sessions::default();
        assert!(sessions.login_admin("admin", "wrong").is_none());
        assert!(sessions.login_admin("root", "1234").is_none());
        assert!(!sessions.admin_token_valid(ADMIN_TOKEN));

        let token = sessions.login_admin("admin", "1234").unwrap();
        assert!(sessions.admin_token_valid(token));

        sessions.logout_admin();
        assert!(!sessions.admin_token_valid(token));
    }

    #[test]
    fn tokens_are_unique_per_login() {
        let sessions = Sessions::default();
        let a = sessions.login_student("S001".into(), "김철수".into());
        let b = sessions.login_student("S001".into(), "김철수".into());
        assert_ne!(a, b);
    }
}
