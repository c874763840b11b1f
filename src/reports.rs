//! Read-only aggregate reports over the school records.

use serde::Serialize;
use tracing::debug;

use crate::error::{RecordResult, StoreError};
use crate::repo::{fetch_all, Repository};
use crate::store::{Row, Store, Value};

/// Contact hours credited per distinct subject in the teacher load report.
pub const HOURS_PER_SUBJECT: i64 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPerformance {
    pub subject_name: String,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub student_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassLoad {
    pub class_name: String,
    pub student_count: i64,
    /// Distinct subject names, sorted, joined with ", ".
    pub subjects: String,
    pub total_hours: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGrade {
    pub subject_name: String,
    pub grade: f64,
    pub class_name: String,
    /// Grades carry no timestamp; always `None`.
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedAverage {
    pub name: String,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum GradeBucket {
    A,
    B,
    C,
    D,
    F,
}

impl GradeBucket {
    pub const ALL: [GradeBucket; 5] = [
        GradeBucket::A,
        GradeBucket::B,
        GradeBucket::C,
        GradeBucket::D,
        GradeBucket::F,
    ];

    /// A: [90,100], B: [80,90), C: [70,80), D: [60,70), F: below 60.
    pub fn classify(value: f64) -> Self {
        if value >= 90.0 {
            GradeBucket::A
        } else if value >= 80.0 {
            GradeBucket::B
        } else if value >= 70.0 {
            GradeBucket::C
        } else if value >= 60.0 {
            GradeBucket::D
        } else {
            GradeBucket::F
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeBucket::A => "A (90-100)",
            GradeBucket::B => "B (80-89)",
            GradeBucket::C => "C (70-79)",
            GradeBucket::D => "D (60-69)",
            GradeBucket::F => "F (Below 60)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketCount {
    pub bucket: GradeBucket,
    pub label: &'static str,
    pub count: i64,
}

/// Counts values per bucket in A..F order. Empty buckets are left out.
pub fn grade_histogram<I>(values: I) -> Vec<BucketCount>
where
    I: IntoIterator<Item = f64>,
{
    let mut counts = [0i64; 5];
    for v in values {
        counts[GradeBucket::classify(v) as usize] += 1;
    }
    GradeBucket::ALL
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(b, count)| BucketCount {
            bucket: *b,
            label: b.label(),
            count,
        })
        .collect()
}

pub struct Reports<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> Reports<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn repo(&self) -> Repository<'a, S> {
        Repository::new(self.store)
    }

    /// Per-subject grade statistics within one class, ordered by subject name.
    pub fn class_performance(&self, class_id: i64) -> RecordResult<Vec<SubjectPerformance>> {
        fetch_all(
            self.store,
            "SELECT sub.name,
                    AVG(g.value),
                    MAX(g.value),
                    MIN(g.value),
                    COUNT(DISTINCT g.student_id)
             FROM grades g
             JOIN subjects sub ON sub.id = g.subject_id
             WHERE g.class_id = ?
             GROUP BY sub.id, sub.name
             ORDER BY sub.name, sub.id",
            &[Value::Integer(class_id)],
            |row| {
                Ok(SubjectPerformance {
                    subject_name: row.text(0)?,
                    average: row.real(1)?,
                    max: row.real(2)?,
                    min: row.real(3)?,
                    student_count: row.int(4)?,
                })
            },
        )
    }

    pub fn class_performance_by_name(
        &self,
        class_name: &str,
    ) -> RecordResult<Vec<SubjectPerformance>> {
        let id = self.repo().classes().id_by_name(class_name)?;
        self.class_performance(id)
    }

    /// One row per class the teacher leads, ordered by class name.
    pub fn teacher_load(&self, teacher_id: i64) -> RecordResult<Vec<ClassLoad>> {
        // Correlated subqueries keep enrollments and subject links from
        // multiplying each other's counts.
        let classes = fetch_all(
            self.store,
            "SELECT c.id,
                    c.name,
                    (SELECT COUNT(DISTINCT e.student_id) FROM enrollments e WHERE e.class_id = c.id),
                    (SELECT COUNT(DISTINCT cs.subject_id) FROM class_subjects cs WHERE cs.class_id = c.id)
             FROM classes c
             WHERE c.teacher_id = ?
             ORDER BY c.name, c.id",
            &[Value::Integer(teacher_id)],
            |row| Ok((row.int(0)?, row.text(1)?, row.int(2)?, row.int(3)?)),
        )?;

        let mut out = Vec::with_capacity(classes.len());
        for (class_id, class_name, student_count, subject_count) in classes {
            let names = fetch_all(
                self.store,
                "SELECT DISTINCT s.name
                 FROM class_subjects cs
                 JOIN subjects s ON s.id = cs.subject_id
                 WHERE cs.class_id = ?
                 ORDER BY s.name",
                &[Value::Integer(class_id)],
                |row| row.text(0),
            )?;
            out.push(ClassLoad {
                class_name,
                student_count,
                subjects: names.join(", "),
                total_hours: subject_count * HOURS_PER_SUBJECT,
            });
        }
        debug!(teacher_id, classes = out.len(), "teacher load computed");
        Ok(out)
    }

    pub fn teacher_load_by_name(&self, teacher_name: &str) -> RecordResult<Vec<ClassLoad>> {
        let id = self.repo().teachers().id_by_name(teacher_name)?;
        self.teacher_load(id)
    }

    /// Every grade a student holds, ordered by subject name.
    pub fn student_performance(&self, student_id: i64) -> RecordResult<Vec<StudentGrade>> {
        fetch_all(
            self.store,
            "SELECT sub.name, g.value, c.name
             FROM grades g
             JOIN classes c ON c.id = g.class_id
             JOIN subjects sub ON sub.id = g.subject_id
             WHERE g.student_id = ?
             ORDER BY sub.name, g.id",
            &[Value::Integer(student_id)],
            |row| {
                Ok(StudentGrade {
                    subject_name: row.text(0)?,
                    grade: row.real(1)?,
                    class_name: row.text(2)?,
                    date: None,
                })
            },
        )
    }

    pub fn student_performance_by_name(
        &self,
        student_name: &str,
    ) -> RecordResult<Vec<StudentGrade>> {
        let id = self.repo().students().id_by_name(student_name)?;
        self.student_performance(id)
    }

    pub fn class_averages(&self) -> RecordResult<Vec<NamedAverage>> {
        fetch_all(
            self.store,
            "SELECT c.name, AVG(g.value)
             FROM grades g
             JOIN classes c ON c.id = g.class_id
             GROUP BY c.id, c.name
             ORDER BY c.name, c.id",
            &[],
            named_average,
        )
    }

    pub fn subject_averages(&self) -> RecordResult<Vec<NamedAverage>> {
        fetch_all(
            self.store,
            "SELECT sub.name, AVG(g.value)
             FROM grades g
             JOIN subjects sub ON sub.id = g.subject_id
             GROUP BY sub.id, sub.name
             ORDER BY sub.name, sub.id",
            &[],
            named_average,
        )
    }

    pub fn gender_distribution(&self) -> RecordResult<Vec<NamedCount>> {
        fetch_all(
            self.store,
            "SELECT gender, COUNT(*) FROM students GROUP BY gender ORDER BY gender",
            &[],
            named_count,
        )
    }

    /// Enrolled students per class. Classes without enrollments report 0.
    pub fn enrollment_distribution(&self) -> RecordResult<Vec<NamedCount>> {
        fetch_all(
            self.store,
            "SELECT c.name, COUNT(DISTINCT e.student_id)
             FROM classes c
             LEFT JOIN enrollments e ON e.class_id = c.id
             GROUP BY c.id, c.name
             ORDER BY c.name, c.id",
            &[],
            named_count,
        )
    }

    pub fn grade_distribution(&self) -> RecordResult<Vec<BucketCount>> {
        let values = fetch_all(self.store, "SELECT value FROM grades", &[], |row| {
            row.real(0)
        })?;
        debug!(grades = values.len(), "grade distribution");
        Ok(grade_histogram(values))
    }
}

fn named_average(row: &Row) -> Result<NamedAverage, StoreError> {
    Ok(NamedAverage {
        name: row.text(0)?,
        average: row.real(1)?,
    })
}

fn named_count(row: &Row) -> Result<NamedCount, StoreError> {
    Ok(NamedCount {
        name: row.text(0)?,
        count: row.int(1)?,
    })
}
