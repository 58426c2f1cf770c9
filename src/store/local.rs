//! File-backed store used in development mode.
//!
//! Each collection lives in its own JSON file under the data directory,
//! mirroring the three keyed blobs the frontend keeps in browser storage.
//! Reads and writes go through whole-collection snapshots; a mutex keeps
//! read-modify-write sequences from interleaving.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use axum::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use time::Duration;

use crate::models::{AttendanceRecord, ClassSession, NewClassSession, NewStudent, Student, STATUS_PRESENT};

use super::{format_date, now_time_string, today, AttendanceStore, DEFAULT_STUDENT_PASSWORD};

const STUDENTS_FILE: &str = "students.json";
const CLASSES_FILE: &str = "classes.json";
const ATTENDANCE_FILE: &str = "attendance_records.json";

pub struct LocalStore {
    data_dir: PathBuf,
    guard: Mutex<()>,
}

fn default_students() -> Vec<Student> {
    let names = [
        ("S001", "김철수"),
        ("S002", "박영희"),
        ("S003", "이민수"),
        ("S004", "정수진"),
        ("S005", "최동욱"),
        ("S006", "한지영"),
        ("S007", "송민호"),
        ("S008", "윤서연"),
        ("S009", "강태현"),
        ("S010", "조은비"),
    ];
    names
        .iter()
        .map(|(id, name)| Student {
            id: (*id).to_string(),
            name: (*name).to_string(),
            student_id: (*id).to_string(),
            password: None,
            active: true,
        })
        .collect()
}

/// Demo sessions dated around the current day so a fresh install has
/// something to check in to.
fn default_classes() -> Vec<ClassSession> {
    let today = today();
    vec![
        ClassSession {
            date: format_date(today - Duration::days(1)),
            class_name: "React 기초반".into(),
            start_time: "09:00".into(),
            end_time: "18:00".into(),
            announcement: Some("실습 위주의 수업입니다. 노트북을 준비해 주세요.".into()),
            attendance_count: 0,
            total_students: 10,
        },
        ClassSession {
            date: format_date(today),
            class_name: "웹개발 심화과정".into(),
            start_time: "10:00".into(),
            end_time: "17:00".into(),
            announcement: Some("프로젝트 발표가 있습니다. 준비해 오세요.".into()),
            attendance_count: 0,
            total_students: 10,
        },
        ClassSession {
            date: format_date(today + Duration::days(1)),
            class_name: "TypeScript 마스터".into(),
            start_time: "14:00".into(),
            end_time: "18:00".into(),
            announcement: Some("최신 TypeScript 5.0 기능을 다룹니다.".into()),
            attendance_count: 0,
            total_students: 10,
        },
    ]
}

impl LocalStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            guard: Mutex::new(()),
        }
    }

    /// Read a collection file. `None` means the file does not exist yet, which
    /// is the signal to seed defaults; I/O or parse faults fold to an empty
    /// collection with a diagnostic log, like every other backend fault.
    fn read<T: DeserializeOwned>(&self, file: &str) -> Option<Vec<T>> {
        let path = self.data_dir.join(file);
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(items) => Some(items),
                Err(e) => {
                    tracing::error!(file, error = %e, "failed to parse collection file");
                    Some(Vec::new())
                }
            },
            Err(e) => {
                tracing::error!(file, error = %e, "failed to read collection file");
                Some(Vec::new())
            }
        }
    }

    fn write<T: Serialize>(&self, file: &str, items: &[T]) -> bool {
        if let Err(e) = fs::create_dir_all(&self.data_dir) {
            tracing::error!(error = %e, "failed to create data directory");
            return false;
        }
        let json = match serde_json::to_string_pretty(items) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(file, error = %e, "failed to serialize collection");
                return false;
            }
        };
        if let Err(e) = fs::write(self.data_dir.join(file), json) {
            tracing::error!(file, error = %e, "failed to write collection file");
            return false;
        }
        true
    }

    /// Load the roster, seeding and persisting the default students on the
    /// very first read.
    fn load_students(&self) -> Vec<Student> {
        match self.read(STUDENTS_FILE) {
            Some(students) => students,
            None => {
                let students = default_students();
                self.write(STUDENTS_FILE, &students);
                students
            }
        }
    }

    fn load_classes(&self) -> Vec<ClassSession> {
        match self.read(CLASSES_FILE) {
            Some(classes) => classes,
            None => {
                let classes = default_classes();
                self.write(CLASSES_FILE, &classes);
                classes
            }
        }
    }

    // Attendance starts empty; no seed.
    fn load_records(&self) -> Vec<AttendanceRecord> {
        self.read(ATTENDANCE_FILE).unwrap_or_default()
    }

    /// Recompute the cached attendance count for one date from the records
    /// collection and persist it. The count is derived state and is never
    /// adjusted incrementally.
    fn recompute_attendance_count(&self, class_date: &str) {
        let mut classes = self.load_classes();
        let records = self.load_records();
        if let Some(class) = classes.iter_mut().find(|c| c.date == class_date) {
            class.attendance_count =
                records.iter().filter(|r| r.class_date == class_date).count() as u32;
            self.write(CLASSES_FILE, &classes);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.guard.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AttendanceStore for LocalStore {
    async fn get_students(&self) -> Vec<Student> {
        let _guard = self.lock();
        self.load_students()
    }

    async fn set_students(&self, students: Vec<Student>) -> bool {
        let _guard = self.lock();
        self.write(STUDENTS_FILE, &students)
    }

    async fn add_student(&self, student: NewStudent) -> bool {
        let _guard = self.lock();
        let mut students = self.load_students();
        if students.iter().any(|s| s.student_id == student.student_id) {
            tracing::warn!(student_id = %student.student_id, "sign-up rejected: handle already taken");
            return false;
        }
        let id = format!("S{:03}", students.len() + 1);
        students.push(Student {
            id,
            name: student.name,
            student_id: student.student_id,
            password: student.password,
            active: student.active,
        });
        self.write(STUDENTS_FILE, &students)
    }

    async fn active_students_count(&self) -> usize {
        let _guard = self.lock();
        self.load_students().iter().filter(|s| s.active).count()
    }

    async fn validate_student_login(&self, student_id: &str, password: &str) -> Option<Student> {
        let _guard = self.lock();
        let students = self.load_students();
        let student = students
            .into_iter()
            .find(|s| s.student_id == student_id && s.active)?;
        let stored = student.password.as_deref().unwrap_or(DEFAULT_STUDENT_PASSWORD);
        if stored == password {
            Some(student)
        } else {
            None
        }
    }

    async fn get_classes(&self) -> Vec<ClassSession> {
        let _guard = self.lock();
        self.load_classes()
    }

    async fn set_classes(&self, classes: Vec<ClassSession>) -> bool {
        let _guard = self.lock();
        self.write(CLASSES_FILE, &classes)
    }

    async fn add_class(&self, class: NewClassSession) -> bool {
        let _guard = self.lock();
        let mut classes = self.load_classes();
        if classes.iter().any(|c| c.date == class.date) {
            tracing::warn!(date = %class.date, "class rejected: session already exists for date");
            return false;
        }
        let total_students = self.load_students().iter().filter(|s| s.active).count() as u32;
        classes.push(ClassSession {
            date: class.date,
            class_name: class.class_name,
            start_time: class.start_time,
            end_time: class.end_time,
            announcement: class.announcement,
            attendance_count: 0,
            total_students,
        });
        self.write(CLASSES_FILE, &classes)
    }

    async fn get_class_by_date(&self, date: &str) -> Option<ClassSession> {
        let _guard = self.lock();
        self.load_classes().into_iter().find(|c| c.date == date)
    }

    async fn get_attendance_records(&self) -> Vec<AttendanceRecord> {
        let _guard = self.lock();
        self.load_records()
    }

    async fn set_attendance_records(&self, records: Vec<AttendanceRecord>) -> bool {
        let _guard = self.lock();
        let ok = self.write(ATTENDANCE_FILE, &records);
        if ok {
            // Bulk replacement can touch any date; bring every cached count
            // back in line.
            let mut classes = self.load_classes();
            for class in classes.iter_mut() {
                class.attendance_count =
                    records.iter().filter(|r| r.class_date == class.date).count() as u32;
            }
            self.write(CLASSES_FILE, &classes);
        }
        ok
    }

    async fn add_attendance_record(&self, student_id: &str, class_date: &str) -> bool {
        let _guard = self.lock();
        if !self.load_classes().iter().any(|c| c.date == class_date) {
            tracing::warn!(%class_date, "check-in rejected: no session for date");
            return false;
        }
        let students = self.load_students();
        let Some(student) = students.iter().find(|s| s.id == student_id) else {
            tracing::warn!(%student_id, "check-in rejected: unknown student");
            return false;
        };
        let mut records = self.load_records();
        if records
            .iter()
            .any(|r| r.student_id == student_id && r.class_date == class_date)
        {
            tracing::warn!(%student_id, %class_date, "check-in rejected: already present");
            return false;
        }
        records.push(AttendanceRecord {
            student_id: student_id.to_string(),
            student_name: student.name.clone(),
            class_date: class_date.to_string(),
            attendance_time: now_time_string(),
            status: STATUS_PRESENT.to_string(),
        });
        if !self.write(ATTENDANCE_FILE, &records) {
            return false;
        }
        self.recompute_attendance_count(class_date);
        true
    }

    async fn remove_attendance_record(&self, student_id: &str, class_date: &str) -> bool {
        let _guard = self.lock();
        let mut records = self.load_records();
        let before = records.len();
        records.retain(|r| !(r.student_id == student_id && r.class_date == class_date));
        if records.len() == before {
            return false;
        }
        if !self.write(ATTENDANCE_FILE, &records) {
            return false;
        }
        self.recompute_attendance_count(class_date);
        true
    }

    async fn get_student_attendance_records(&self, student_id: &str) -> Vec<AttendanceRecord> {
        let _guard = self.lock();
        self.load_records()
            .into_iter()
            .filter(|r| r.student_id == student_id)
            .collect()
    }

    async fn get_attendance_by_date(&self, date: &str) -> Vec<AttendanceRecord> {
        let _guard = self.lock();
        self.load_records()
            .into_iter()
            .filter(|r| r.class_date == date)
            .collect()
    }

    async fn reset_data(&self) -> bool {
        let _guard = self.lock();
        for file in [STUDENTS_FILE, CLASSES_FILE, ATTENDANCE_FILE] {
            let path = self.data_dir.join(file);
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    tracing::error!(file, error = %e, "failed to remove collection file");
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewClassSession;

    fn temp_store(label: &str) -> LocalStore {
        let dir = std::env::temp_dir().join(format!("rollcall-{}-{}", label, uuid::Uuid::new_v4()));
        LocalStore::new(dir)
    }

    fn new_class(date: &str, name: &str) -> NewClassSession {
        NewClassSession {
            date: date.into(),
            class_name: name.into(),
            start_time: "09:00".into(),
            end_time: "10:00".into(),
            announcement: None,
        }
    }

    #[tokio::test]
    async fn first_read_seeds_default_dataset() {
        let store = temp_store("seed");

        let students = store.get_students().await;
        assert_eq!(students.len(), 10);
        assert!(students.iter().all(|s| s.active && s.password.is_none()));

        let classes = store.get_classes().await;
        assert_eq!(classes.len(), 3);
        let today = today();
        let expected = [
            format_date(today - Duration::days(1)),
            format_date(today),
            format_date(today + Duration::days(1)),
        ];
        let dates: Vec<_> = classes.iter().map(|c| c.date.clone()).collect();
        assert_eq!(dates, expected);

        // Seed is persisted, not regenerated.
        assert_eq!(store.get_classes().await.len(), 3);
        assert!(store.get_attendance_records().await.is_empty());
    }

    #[tokio::test]
    async fn add_class_rejects_duplicate_date_and_keeps_original() {
        let store = temp_store("dupclass");
        assert!(store.add_class(new_class("2025-01-10", "X")).await);
        assert!(!store.add_class(new_class("2025-01-10", "Y")).await);

        let matching: Vec<_> = store
            .get_classes()
            .await
            .into_iter()
            .filter(|c| c.date == "2025-01-10")
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].class_name, "X");
    }

    #[tokio::test]
    async fn add_class_snapshots_active_student_count() {
        let store = temp_store("snapshot");
        let mut students = store.get_students().await;
        students[0].active = false;
        assert!(store.set_students(students).await);

        assert!(store.add_class(new_class("2025-02-01", "X")).await);
        let class = store.get_class_by_date("2025-02-01").await.unwrap();
        assert_eq!(class.total_students, 9);
        assert_eq!(class.attendance_count, 0);
    }

    #[tokio::test]
    async fn check_in_is_unique_and_keeps_count_consistent() {
        let store = temp_store("checkin");
        store.get_students().await;
        assert!(store.add_class(new_class("2025-01-10", "X")).await);

        assert!(store.add_attendance_record("S001", "2025-01-10").await);
        assert!(!store.add_attendance_record("S001", "2025-01-10").await);
        assert!(store.add_attendance_record("S002", "2025-01-10").await);

        let records = store.get_attendance_by_date("2025-01-10").await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].student_name, "김철수");
        assert_eq!(records[0].status, STATUS_PRESENT);

        let class = store.get_class_by_date("2025-01-10").await.unwrap();
        assert_eq!(class.attendance_count, 2);
    }

    #[tokio::test]
    async fn check_in_requires_session_and_known_student() {
        let store = temp_store("refmiss");
        store.get_students().await;
        assert!(!store.add_attendance_record("S001", "1999-12-31").await);

        assert!(store.add_class(new_class("2025-01-10", "X")).await);
        assert!(!store.add_attendance_record("NOPE", "2025-01-10").await);
        assert!(store.get_attendance_by_date("2025-01-10").await.is_empty());
    }

    #[tokio::test]
    async fn check_out_round_trip_restores_count() {
        let store = temp_store("checkout");
        store.get_students().await;
        assert!(store.add_class(new_class("2025-01-10", "X")).await);

        assert!(store.add_attendance_record("S001", "2025-01-10").await);
        assert!(store.remove_attendance_record("S001", "2025-01-10").await);

        let class = store.get_class_by_date("2025-01-10").await.unwrap();
        assert_eq!(class.attendance_count, 0);
        assert!(store.get_attendance_by_date("2025-01-10").await.is_empty());

        // Nothing left to remove.
        assert!(!store.remove_attendance_record("S001", "2025-01-10").await);
    }

    #[tokio::test]
    async fn login_uses_stored_or_default_password() {
        let store = temp_store("login");

        // Seeded students carry no password, so the default applies.
        let student = store.validate_student_login("S001", "1234").await.unwrap();
        assert_eq!(student.name, "김철수");
        assert!(store.validate_student_login("S001", "wrong").await.is_none());
        assert!(store.validate_student_login("missing", "1234").await.is_none());

        // Inactive students cannot log in even with the right password.
        let mut students = store.get_students().await;
        students[0].active = false;
        store.set_students(students).await;
        assert!(store.validate_student_login("S001", "1234").await.is_none());
    }

    #[tokio::test]
    async fn sign_up_then_login() {
        let store = temp_store("signup");
        assert!(
            store
                .add_student(NewStudent {
                    name: "Kim".into(),
                    student_id: "S099".into(),
                    password: Some("ab12".into()),
                    active: true,
                })
                .await
        );

        let student = store.validate_student_login("S099", "ab12").await.unwrap();
        assert_eq!(student.name, "Kim");
        assert!(store.validate_student_login("S099", "wrong").await.is_none());
        assert!(store.validate_student_login("S099", "1234").await.is_none());
    }

    #[tokio::test]
    async fn sign_up_rejects_taken_handle() {
        let store = temp_store("duphandle");
        store.get_students().await;
        assert!(
            !store
                .add_student(NewStudent {
                    name: "Imposter".into(),
                    student_id: "S001".into(),
                    password: None,
                    active: true,
                })
                .await
        );
        assert_eq!(store.get_students().await.len(), 10);
    }

    #[tokio::test]
    async fn bulk_record_replacement_realigns_counts() {
        let store = temp_store("bulk");
        store.get_students().await;
        assert!(store.add_class(new_class("2025-01-10", "X")).await);
        assert!(store.add_attendance_record("S001", "2025-01-10").await);

        assert!(store.set_attendance_records(Vec::new()).await);
        let class = store.get_class_by_date("2025-01-10").await.unwrap();
        assert_eq!(class.attendance_count, 0);
    }

    #[tokio::test]
    async fn reset_wipes_collections_and_reseeds_on_next_read() {
        let store = temp_store("reset");
        store.get_students().await;
        assert!(store.add_class(new_class("2025-03-01", "X")).await);
        assert!(store.reset_data().await);

        // Fresh read seeds the defaults again; the added class is gone.
        let classes = store.get_classes().await;
        assert_eq!(classes.len(), 3);
        assert!(classes.iter().all(|c| c.date != "2025-03-01"));
    }
}
