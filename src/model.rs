use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{RecordError, RecordResult, StoreError};
use crate::store::Row;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Format SQLite's CURRENT_TIMESTAMP produces.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const GRADE_MIN: f64 = 0.0;
pub const GRADE_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Student,
    Teacher,
    Class,
    Subject,
    ClassSubject,
    Enrollment,
    Grade,
}

impl Entity {
    pub fn as_str(self) -> &'static str {
        match self {
            Entity::Student => "student",
            Entity::Teacher => "teacher",
            Entity::Class => "class",
            Entity::Subject => "subject",
            Entity::ClassSubject => "class subject",
            Entity::Enrollment => "enrollment",
            Entity::Grade => "grade",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
}

impl Gender {
    pub fn code(self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
        }
    }

    pub fn parse(raw: &str) -> RecordResult<Self> {
        match raw.trim() {
            "M" | "m" => Ok(Gender::M),
            "F" | "f" => Ok(Gender::F),
            other => Err(RecordError::validation(
                "gender",
                format!("expected M or F, got {other:?}"),
            )),
        }
    }
}

pub fn required_name(field: &'static str, raw: &str) -> RecordResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RecordError::validation(field, "must not be empty"));
    }
    Ok(name.to_string())
}

/// Trims optional free-text columns; blank input is stored as NULL.
pub fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn parse_date(field: &'static str, raw: &str) -> RecordResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| RecordError::validation(field, format!("{raw:?} is not YYYY-MM-DD: {e}")))
}

pub fn validate_grade(value: f64) -> RecordResult<f64> {
    if !value.is_finite() || !(GRADE_MIN..=GRADE_MAX).contains(&value) {
        return Err(RecordError::validation(
            "grade",
            format!("{value} is outside [{GRADE_MIN}, {GRADE_MAX}]"),
        ));
    }
    Ok(value)
}

fn stored_date(row: &Row, index: usize) -> Result<NaiveDate, StoreError> {
    let raw = row.text(index)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|_| StoreError::Decode {
        index,
        expected: "YYYY-MM-DD date",
    })
}

fn stored_timestamp(row: &Row, index: usize) -> Result<NaiveDateTime, StoreError> {
    let raw = row.text(index)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(|_| StoreError::Decode {
        index,
        expected: "YYYY-MM-DD HH:MM:SS timestamp",
    })
}

fn stored_gender(row: &Row, index: usize) -> Result<Gender, StoreError> {
    Gender::parse(&row.text(index)?).map_err(|_| StoreError::Decode {
        index,
        expected: "gender code",
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentInput {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Student {
    /// Column order: id, full_name, date_of_birth, gender, email, phone, address.
    pub fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Student {
            id: row.int(0)?,
            full_name: row.text(1)?,
            date_of_birth: stored_date(row, 2)?,
            gender: stored_gender(row, 3)?,
            email: row.opt_text(4)?,
            phone: row.opt_text(5)?,
            address: row.opt_text(6)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherInput {
    pub full_name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: i64,
    pub full_name: String,
    pub department: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Teacher {
    /// Column order: id, full_name, department, email, phone.
    pub fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Teacher {
            id: row.int(0)?,
            full_name: row.text(1)?,
            department: row.opt_text(2)?,
            email: row.opt_text(3)?,
            phone: row.opt_text(4)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInput {
    pub name: String,
    #[serde(default)]
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub teacher_id: Option<i64>,
}

impl Class {
    /// Column order: id, name, teacher_id.
    pub fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Class {
            id: row.int(0)?,
            name: row.text(1)?,
            teacher_id: row.opt_int(2)?,
        })
    }
}

/// A class with its teacher's display name resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOverview {
    pub id: i64,
    pub name: String,
    pub teacher_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl Subject {
    /// Column order: id, name, description.
    pub fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Subject {
            id: row.int(0)?,
            name: row.text(1)?,
            description: row.opt_text(2)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentListing {
    pub student_id: i64,
    pub student_name: String,
    pub class_name: String,
    pub enrolled_at: NaiveDateTime,
}

impl EnrollmentListing {
    /// Column order: student_id, student_name, class_name, enrolled_at.
    pub fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(EnrollmentListing {
            student_id: row.int(0)?,
            student_name: row.text(1)?,
            class_name: row.text(2)?,
            enrolled_at: stored_timestamp(row, 3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub student_id: i64,
    pub full_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeInput {
    pub student_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub value: f64,
}

impl Grade {
    /// Column order: id, student_id, class_id, subject_id, value.
    pub fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Grade {
            id: row.int(0)?,
            student_id: row.int(1)?,
            class_id: row.int(2)?,
            subject_id: row.int(3)?,
            value: row.real(4)?,
        })
    }
}

/// A grade joined with the display names of what it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeListing {
    pub id: i64,
    pub student_name: String,
    pub class_name: String,
    pub subject_name: String,
    pub value: f64,
}

impl GradeListing {
    /// Column order: grade_id, student_name, class_name, subject_name, value.
    pub fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(GradeListing {
            id: row.int(0)?,
            student_name: row.text(1)?,
            class_name: row.text(2)?,
            subject_name: row.text(3)?,
            value: row.real(4)?,
        })
    }
}
