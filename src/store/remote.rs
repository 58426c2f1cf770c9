//! Postgres-backed store for hosted deployments.
//!
//! Table columns are snake_case and typed (UUID ids, DATE columns); the
//! translation to the application's entity shapes happens here and nowhere
//! else. Transport faults are logged and folded into the same empty/false
//! results as business-rule rejections, so callers branch on one shape of
//! outcome regardless of the cause.

use axum::async_trait;
use sqlx::{FromRow, PgPool};
use time::Date;
use uuid::Uuid;

use crate::models::{AttendanceRecord, ClassSession, NewClassSession, NewStudent, Student, STATUS_PRESENT};

use super::{format_date, now_time_string, AttendanceStore, DATE_FMT, DEFAULT_STUDENT_PASSWORD};

pub struct RemoteStore {
    db: PgPool,
}

#[derive(Debug, Clone, FromRow)]
struct StudentRow {
    id: Uuid,
    name: String,
    student_id: String,
    password: Option<String>,
    active: bool,
}

#[derive(Debug, Clone, FromRow)]
struct ClassRow {
    date: Date,
    class_name: String,
    start_time: String,
    end_time: String,
    announcement: Option<String>,
    attendance_count: i32,
    total_students: i32,
}

#[derive(Debug, Clone, FromRow)]
struct AttendanceRow {
    student_id: Uuid,
    student_name: String,
    class_date: Date,
    attendance_time: String,
    status: String,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: row.id.to_string(),
            name: row.name,
            student_id: row.student_id,
            password: row.password,
            active: row.active,
        }
    }
}

impl From<ClassRow> for ClassSession {
    fn from(row: ClassRow) -> Self {
        ClassSession {
            date: format_date(row.date),
            class_name: row.class_name,
            start_time: row.start_time,
            end_time: row.end_time,
            announcement: row.announcement,
            attendance_count: row.attendance_count.max(0) as u32,
            total_students: row.total_students.max(0) as u32,
        }
    }
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord {
            student_id: row.student_id.to_string(),
            student_name: row.student_name,
            class_date: format_date(row.class_date),
            attendance_time: row.attendance_time,
            status: row.status,
        }
    }
}

fn parse_date(date: &str) -> Option<Date> {
    match Date::parse(date, &DATE_FMT) {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(%date, error = %e, "invalid calendar date");
            None
        }
    }
}

impl RemoteStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn try_get_students(&self) -> anyhow::Result<Vec<Student>> {
        let rows = sqlx::query_as::<_, StudentRow>(
            r#"
            SELECT id, name, student_id, password, active
            FROM students
            WHERE active = TRUE
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Student::from).collect())
    }

    async fn try_add_student(&self, student: NewStudent) -> anyhow::Result<bool> {
        let taken = sqlx::query_scalar::<_, i32>(
            r#"SELECT 1 FROM students WHERE student_id = $1"#,
        )
        .bind(&student.student_id)
        .fetch_optional(&self.db)
        .await?;
        if taken.is_some() {
            tracing::warn!(student_id = %student.student_id, "sign-up rejected: handle already taken");
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO students (name, student_id, password, active)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&student.name)
        .bind(&student.student_id)
        .bind(&student.password)
        .bind(student.active)
        .execute(&self.db)
        .await?;
        Ok(true)
    }

    async fn try_active_students_count(&self) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM students WHERE active = TRUE"#,
        )
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    async fn try_validate_student_login(
        &self,
        student_id: &str,
        password: &str,
    ) -> anyhow::Result<Option<Student>> {
        let row = sqlx::query_as::<_, StudentRow>(
            r#"
            SELECT id, name, student_id, password, active
            FROM students
            WHERE student_id = $1 AND active = TRUE
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let stored = row.password.as_deref().unwrap_or(DEFAULT_STUDENT_PASSWORD);
        if stored == password {
            Ok(Some(row.into()))
        } else {
            Ok(None)
        }
    }

    async fn try_get_classes(&self) -> anyhow::Result<Vec<ClassSession>> {
        let rows = sqlx::query_as::<_, ClassRow>(
            r#"
            SELECT date, class_name, start_time, end_time, announcement,
                   attendance_count, total_students
            FROM classes
            ORDER BY date ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(ClassSession::from).collect())
    }

    async fn try_add_class(&self, class: NewClassSession) -> anyhow::Result<bool> {
        let Some(date) = parse_date(&class.date) else {
            return Ok(false);
        };

        let exists = sqlx::query_scalar::<_, i32>(r#"SELECT 1 FROM classes WHERE date = $1"#)
            .bind(date)
            .fetch_optional(&self.db)
            .await?;
        if exists.is_some() {
            tracing::warn!(date = %class.date, "class rejected: session already exists for date");
            return Ok(false);
        }

        let total_students = self.try_active_students_count().await?;

        sqlx::query(
            r#"
            INSERT INTO classes (date, class_name, start_time, end_time, announcement,
                                 attendance_count, total_students)
            VALUES ($1, $2, $3, $4, $5, 0, $6)
            "#,
        )
        .bind(date)
        .bind(&class.class_name)
        .bind(&class.start_time)
        .bind(&class.end_time)
        .bind(&class.announcement)
        .bind(total_students as i32)
        .execute(&self.db)
        .await?;
        Ok(true)
    }

    async fn try_get_class_by_date(&self, date: Date) -> anyhow::Result<Option<ClassSession>> {
        let row = sqlx::query_as::<_, ClassRow>(
            r#"
            SELECT date, class_name, start_time, end_time, announcement,
                   attendance_count, total_students
            FROM classes
            WHERE date = $1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(ClassSession::from))
    }

    async fn try_get_attendance_records(&self) -> anyhow::Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT student_id, student_name, class_date, attendance_time, status
            FROM attendance_records
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    async fn try_add_attendance_record(
        &self,
        student_id: Uuid,
        class_date: Date,
    ) -> anyhow::Result<bool> {
        let session = sqlx::query_scalar::<_, i32>(r#"SELECT 1 FROM classes WHERE date = $1"#)
            .bind(class_date)
            .fetch_optional(&self.db)
            .await?;
        if session.is_none() {
            tracing::warn!(date = %format_date(class_date), "check-in rejected: no session for date");
            return Ok(false);
        }

        let student_name =
            sqlx::query_scalar::<_, String>(r#"SELECT name FROM students WHERE id = $1"#)
                .bind(student_id)
                .fetch_optional(&self.db)
                .await?;
        let Some(student_name) = student_name else {
            tracing::warn!(%student_id, "check-in rejected: unknown student");
            return Ok(false);
        };

        let duplicate = sqlx::query_scalar::<_, i32>(
            r#"SELECT 1 FROM attendance_records WHERE student_id = $1 AND class_date = $2"#,
        )
        .bind(student_id)
        .bind(class_date)
        .fetch_optional(&self.db)
        .await?;
        if duplicate.is_some() {
            tracing::warn!(%student_id, date = %format_date(class_date), "check-in rejected: already present");
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO attendance_records (student_id, student_name, class_date,
                                            attendance_time, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(student_id)
        .bind(&student_name)
        .bind(class_date)
        .bind(now_time_string())
        .bind(STATUS_PRESENT)
        .execute(&self.db)
        .await?;

        self.try_recompute_attendance_count(class_date).await?;
        Ok(true)
    }

    /// Recompute the derived count from the records table and write it back.
    async fn try_recompute_attendance_count(&self, class_date: Date) -> anyhow::Result<()> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM attendance_records WHERE class_date = $1"#,
        )
        .bind(class_date)
        .fetch_one(&self.db)
        .await?;

        sqlx::query(r#"UPDATE classes SET attendance_count = $1 WHERE date = $2"#)
            .bind(count as i32)
            .bind(class_date)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn try_get_student_attendance_records(
        &self,
        student_id: Uuid,
    ) -> anyhow::Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT student_id, student_name, class_date, attendance_time, status
            FROM attendance_records
            WHERE student_id = $1
            ORDER BY class_date DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    async fn try_get_attendance_by_date(&self, date: Date) -> anyhow::Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT student_id, student_name, class_date, attendance_time, status
            FROM attendance_records
            WHERE class_date = $1
            ORDER BY attendance_time ASC
            "#,
        )
        .bind(date)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }
}

#[async_trait]
impl AttendanceStore for RemoteStore {
    async fn get_students(&self) -> Vec<Student> {
        match self.try_get_students().await {
            Ok(students) => students,
            Err(e) => {
                tracing::error!(error = %e, "get_students failed");
                Vec::new()
            }
        }
    }

    async fn set_students(&self, _students: Vec<Student>) -> bool {
        tracing::warn!("bulk roster replacement is not supported on the remote store; use add_student");
        false
    }

    async fn add_student(&self, student: NewStudent) -> bool {
        match self.try_add_student(student).await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::error!(error = %e, "add_student failed");
                false
            }
        }
    }

    async fn active_students_count(&self) -> usize {
        match self.try_active_students_count().await {
            Ok(count) => count.max(0) as usize,
            Err(e) => {
                tracing::error!(error = %e, "active_students_count failed");
                0
            }
        }
    }

    async fn validate_student_login(&self, student_id: &str, password: &str) -> Option<Student> {
        match self.try_validate_student_login(student_id, password).await {
            Ok(student) => student,
            Err(e) => {
                tracing::error!(error = %e, "validate_student_login failed");
                None
            }
        }
    }

    async fn get_classes(&self) -> Vec<ClassSession> {
        match self.try_get_classes().await {
            Ok(classes) => classes,
            Err(e) => {
                tracing::error!(error = %e, "get_classes failed");
                Vec::new()
            }
        }
    }

    async fn set_classes(&self, _classes: Vec<ClassSession>) -> bool {
        tracing::warn!("bulk session replacement is not supported on the remote store; use add_class");
        false
    }

    async fn add_class(&self, class: NewClassSession) -> bool {
        match self.try_add_class(class).await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::error!(error = %e, "add_class failed");
                false
            }
        }
    }

    async fn get_class_by_date(&self, date: &str) -> Option<ClassSession> {
        let date = parse_date(date)?;
        match self.try_get_class_by_date(date).await {
            Ok(class) => class,
            Err(e) => {
                tracing::error!(error = %e, "get_class_by_date failed");
                None
            }
        }
    }

    async fn get_attendance_records(&self) -> Vec<AttendanceRecord> {
        match self.try_get_attendance_records().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "get_attendance_records failed");
                Vec::new()
            }
        }
    }

    async fn set_attendance_records(&self, _records: Vec<AttendanceRecord>) -> bool {
        tracing::warn!(
            "bulk attendance replacement is not supported on the remote store; use add_attendance_record"
        );
        false
    }

    async fn add_attendance_record(&self, student_id: &str, class_date: &str) -> bool {
        // A handle that is not a UUID cannot reference a remote student.
        let Ok(student_id) = Uuid::parse_str(student_id) else {
            tracing::warn!(%student_id, "check-in rejected: unknown student");
            return false;
        };
        let Some(class_date) = parse_date(class_date) else {
            return false;
        };
        match self.try_add_attendance_record(student_id, class_date).await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::error!(error = %e, "add_attendance_record failed");
                false
            }
        }
    }

    async fn remove_attendance_record(&self, _student_id: &str, _class_date: &str) -> bool {
        tracing::warn!("attendance record removal is not supported on the remote store");
        false
    }

    async fn get_student_attendance_records(&self, student_id: &str) -> Vec<AttendanceRecord> {
        let Ok(student_id) = Uuid::parse_str(student_id) else {
            return Vec::new();
        };
        match self.try_get_student_attendance_records(student_id).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "get_student_attendance_records failed");
                Vec::new()
            }
        }
    }

    async fn get_attendance_by_date(&self, date: &str) -> Vec<AttendanceRecord> {
        let Some(date) = parse_date(date) else {
            return Vec::new();
        };
        match self.try_get_attendance_by_date(date).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "get_attendance_by_date failed");
                Vec::new()
            }
        }
    }

    async fn reset_data(&self) -> bool {
        tracing::warn!("reset_data is not supported on the remote store");
        false
    }
}
