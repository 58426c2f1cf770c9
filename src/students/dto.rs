use serde::Deserialize;

/// Request body for the admin roster form. `active` defaults to true; a
/// missing password means the student uses the system default.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub name: String,
    pub student_id: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}
