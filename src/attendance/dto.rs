use serde::Deserialize;

/// Request body for a student check-in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub class_date: String,
}
