use serde::{Deserialize, Serialize};

use crate::models::Student;

/// Request body for student login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentLoginRequest {
    pub student_id: String,
    pub password: String,
}

/// Request body for student sign-up.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub student_id: String,
    pub name: String,
    pub password: String,
}

/// Request body for admin login.
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub id: String,
    pub password: String,
}

/// Public part of a student returned to clients; the stored password never
/// leaves the backend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicStudent {
    pub id: String,
    pub name: String,
    pub student_id: String,
    pub active: bool,
}

impl From<Student> for PublicStudent {
    fn from(student: Student) -> Self {
        PublicStudent {
            id: student.id,
            name: student.name,
            student_id: student.student_id,
            active: student.active,
        }
    }
}

/// Response returned after a successful student login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentLoginResponse {
    pub token: String,
    pub student: PublicStudent,
}

/// Response returned after a successful admin login.
#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
}
