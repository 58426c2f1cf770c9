use serde::Deserialize;

use crate::models::NewClassSession;

/// Request body for the class-creation form. The derived fields
/// (`attendanceCount`, `totalStudents`) are filled in by the store.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub date: String,
    pub class_name: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub announcement: Option<String>,
}

impl From<CreateClassRequest> for NewClassSession {
    fn from(req: CreateClassRequest) -> Self {
        NewClassSession {
            date: req.date,
            class_name: req.class_name,
            start_time: req.start_time,
            end_time: req.end_time,
            announcement: req.announcement,
        }
    }
}
