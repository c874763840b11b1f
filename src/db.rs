use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::error::StoreError;
use crate::store::{SqliteStore, Store};

pub const DB_FILE_NAME: &str = "school.sqlite3";

const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS students(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        full_name TEXT NOT NULL,
        date_of_birth TEXT NOT NULL,
        gender TEXT NOT NULL CHECK(gender IN ('M', 'F')),
        email TEXT,
        phone TEXT,
        address TEXT
    )",
    "CREATE TABLE IF NOT EXISTS teachers(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        full_name TEXT NOT NULL,
        department TEXT,
        email TEXT,
        phone TEXT
    )",
    "CREATE TABLE IF NOT EXISTS classes(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        teacher_id INTEGER,
        FOREIGN KEY(teacher_id) REFERENCES teachers(id)
    )",
    "CREATE TABLE IF NOT EXISTS subjects(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT
    )",
    // No uniqueness on (class_id, subject_id): duplicate links are tolerated and
    // collapsed by the readers.
    "CREATE TABLE IF NOT EXISTS class_subjects(
        class_id INTEGER NOT NULL,
        subject_id INTEGER NOT NULL,
        FOREIGN KEY(class_id) REFERENCES classes(id),
        FOREIGN KEY(subject_id) REFERENCES subjects(id)
    )",
    // (student_id, class_id) uniqueness is checked by callers before inserting.
    "CREATE TABLE IF NOT EXISTS enrollments(
        student_id INTEGER NOT NULL,
        class_id INTEGER NOT NULL,
        enrolled_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY(student_id) REFERENCES students(id),
        FOREIGN KEY(class_id) REFERENCES classes(id)
    )",
    "CREATE TABLE IF NOT EXISTS grades(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL,
        class_id INTEGER NOT NULL,
        subject_id INTEGER NOT NULL,
        value REAL NOT NULL CHECK(value >= 0 AND value <= 100),
        FOREIGN KEY(student_id) REFERENCES students(id),
        FOREIGN KEY(class_id) REFERENCES classes(id),
        FOREIGN KEY(subject_id) REFERENCES subjects(id)
    )",
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_students_name ON students(full_name)",
    "CREATE INDEX IF NOT EXISTS idx_teachers_name ON teachers(full_name)",
    "CREATE INDEX IF NOT EXISTS idx_classes_name ON classes(name)",
    "CREATE INDEX IF NOT EXISTS idx_classes_teacher ON classes(teacher_id)",
    "CREATE INDEX IF NOT EXISTS idx_subjects_name ON subjects(name)",
    "CREATE INDEX IF NOT EXISTS idx_class_subjects_class ON class_subjects(class_id)",
    "CREATE INDEX IF NOT EXISTS idx_class_subjects_subject ON class_subjects(subject_id)",
    "CREATE INDEX IF NOT EXISTS idx_enrollments_student ON enrollments(student_id)",
    "CREATE INDEX IF NOT EXISTS idx_enrollments_class ON enrollments(class_id)",
    "CREATE INDEX IF NOT EXISTS idx_grades_student ON grades(student_id)",
    "CREATE INDEX IF NOT EXISTS idx_grades_class ON grades(class_id)",
    "CREATE INDEX IF NOT EXISTS idx_grades_subject ON grades(subject_id)",
];

/// Creates every table and index that is not there yet. Safe to run on each open.
pub fn ensure_schema<S: Store + ?Sized>(store: &S) -> Result<(), StoreError> {
    for sql in TABLES.iter().chain(INDEXES) {
        store.execute(sql, &[])?;
    }
    Ok(())
}

pub fn open_workspace(workspace: &Path) -> anyhow::Result<SqliteStore> {
    std::fs::create_dir_all(workspace).with_context(|| {
        format!(
            "failed to create workspace {}",
            workspace.to_string_lossy()
        )
    })?;
    let db_path = workspace.join(DB_FILE_NAME);
    let store = SqliteStore::open_file(&db_path);
    store
        .connect()
        .with_context(|| format!("failed to open {}", db_path.to_string_lossy()))?;
    ensure_schema(&store).context("failed to create schema")?;
    info!(path = %db_path.display(), "workspace database ready");
    Ok(store)
}
