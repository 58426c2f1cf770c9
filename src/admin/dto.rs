use serde::Serialize;

/// Aggregate numbers for the admin dashboard header.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub active_students: usize,
    pub total_students: usize,
    pub total_classes: usize,
    pub total_attendance_records: usize,
}
