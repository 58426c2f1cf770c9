use std::sync::Arc;

use axum::async_trait;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::config::AppConfig;
use crate::models::{AttendanceRecord, ClassSession, NewClassSession, NewStudent, Student};

pub mod local;
pub mod remote;

pub use local::LocalStore;
pub use remote::RemoteStore;

/// Password assumed for students that never set one.
pub const DEFAULT_STUDENT_PASSWORD: &str = "1234";

pub const DATE_FMT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
pub const TIME_FMT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

pub(crate) fn format_date(date: Date) -> String {
    date.format(&DATE_FMT).unwrap_or_default()
}

/// Current calendar date as the `YYYY-MM-DD` key used throughout the store.
pub(crate) fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Current wall-clock time formatted the way attendance records store it.
pub(crate) fn now_time_string() -> String {
    OffsetDateTime::now_utc()
        .time()
        .format(&TIME_FMT)
        .unwrap_or_default()
}

/// The one data contract every consumer goes through, regardless of which
/// backend is active.
///
/// Failure reporting follows the application's convention: business-rule
/// rejections (duplicate key, referential miss) and backend faults both come
/// back as `false` / `None` / empty, never as an error. Backend faults are
/// additionally logged through `tracing` so they stay diagnosable.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    // Roster
    async fn get_students(&self) -> Vec<Student>;
    /// Replace the whole roster. Supported by the local backend only.
    async fn set_students(&self, students: Vec<Student>) -> bool;
    /// Add a student, enforcing login-handle uniqueness across the roster.
    async fn add_student(&self, student: NewStudent) -> bool;
    async fn active_students_count(&self) -> usize;
    /// Look up an active student by handle and compare the supplied password
    /// against the stored one, falling back to [`DEFAULT_STUDENT_PASSWORD`]
    /// when none is stored.
    async fn validate_student_login(&self, student_id: &str, password: &str) -> Option<Student>;

    // Class sessions
    async fn get_classes(&self) -> Vec<ClassSession>;
    /// Replace all sessions. Supported by the local backend only.
    async fn set_classes(&self, classes: Vec<ClassSession>) -> bool;
    /// Create a session. Fails if one already exists for the date; snapshots
    /// the active roster size into `total_students`.
    async fn add_class(&self, class: NewClassSession) -> bool;
    async fn get_class_by_date(&self, date: &str) -> Option<ClassSession>;

    // Attendance
    async fn get_attendance_records(&self) -> Vec<AttendanceRecord>;
    /// Replace all records. Supported by the local backend only.
    async fn set_attendance_records(&self, records: Vec<AttendanceRecord>) -> bool;
    /// Check a student in. Fails when no session exists for the date, the
    /// student id is unknown, or a record already exists for the pair.
    /// Recomputes the owning session's attendance count before returning.
    async fn add_attendance_record(&self, student_id: &str, class_date: &str) -> bool;
    /// Cancel a check-in. Local backend only; the remote backend reports
    /// failure unconditionally (documented capability gap).
    async fn remove_attendance_record(&self, student_id: &str, class_date: &str) -> bool;
    async fn get_student_attendance_records(&self, student_id: &str) -> Vec<AttendanceRecord>;
    async fn get_attendance_by_date(&self, date: &str) -> Vec<AttendanceRecord>;

    /// Wipe all collections. Development helper, local backend only.
    async fn reset_data(&self) -> bool;
}

/// Select the active backend once at startup.
///
/// Development mode (explicit flag, or no database configured) uses the
/// file-backed local store; otherwise we connect to Postgres and run
/// migrations. The choice is made here and nowhere else — callers hold the
/// trait object for the process lifetime.
pub async fn init_store(config: &AppConfig) -> anyhow::Result<Arc<dyn AttendanceStore>> {
    if config.development_mode() {
        tracing::info!(data_dir = %config.local_data_dir.display(), "using local file-backed store");
        return Ok(Arc::new(LocalStore::new(config.local_data_dir.clone())));
    }

    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL required outside development mode"))?;

    let db = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    tracing::info!("using remote Postgres store");
    Ok(Arc::new(RemoteStore::new(db)))
}
