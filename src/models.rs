use serde::{Deserialize, Serialize};

/// Status value written to every attendance record. The app only ever tracks
/// presence; absence is the lack of a record.
pub const STATUS_PRESENT: &str = "present";

/// A student on the roster.
///
/// `id` is the generated entity id; `student_id` is the human-chosen login
/// handle and must stay unique across the whole roster, active or not.
/// Field names serialize in camelCase so the on-disk collections keep the
/// same shape the frontend works with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub student_id: String,
    /// Stored password. `None` means the system-wide default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub active: bool,
}

/// Student fields as supplied at sign-up, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub student_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub active: bool,
}

/// One scheduled class meeting, keyed uniquely by calendar date.
///
/// `attendance_count` is a derived cache: it must always equal the number of
/// attendance records whose `class_date` matches `date`, and is recomputed
/// after every attendance mutation rather than adjusted in place.
/// `total_students` is snapshotted from the active roster size at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    pub date: String,
    pub class_name: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement: Option<String>,
    pub attendance_count: u32,
    pub total_students: u32,
}

/// Session fields as supplied by the admin, before the derived fields are
/// filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClassSession {
    pub date: String,
    pub class_name: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement: Option<String>,
}

/// One student's check-in for one class date.
///
/// `student_name` is denormalized at check-in time so attendance lists render
/// without a roster join. At most one record exists per (student, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: String,
    pub student_name: String,
    pub class_date: String,
    pub attendance_time: String,
    pub status: String,
}
