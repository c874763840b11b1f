use tracing::{debug, info};

use crate::error::{RecordError, RecordResult};
use crate::model::{Entity, EnrollmentListing, RosterEntry};
use crate::query::FilteredQuery;
use crate::store::{with_transaction, Store, Value};

use super::{delete_rows, fetch_all};

const LISTING_BASE: &str = "SELECT e.student_id, s.full_name, c.name, e.enrolled_at
    FROM enrollments e
    JOIN students s ON s.id = e.student_id
    JOIN classes c ON c.id = e.class_id";
const LISTING_ORDER: &str = "s.full_name, c.name, e.student_id";

pub struct Enrollments<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> Enrollments<'a, S> {
    pub(super) fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Inserts the enrollment with the current timestamp. Does not look for an
    /// existing identical enrollment; callers check `is_enrolled` first.
    pub fn enroll(&self, student_id: i64, class_id: i64) -> RecordResult<()> {
        self.store
            .execute(
                "INSERT INTO enrollments(student_id, class_id) VALUES(?, ?)",
                &[Value::Integer(student_id), Value::Integer(class_id)],
            )
            .map_err(|e| RecordError::from_write(Entity::Enrollment, e))?;
        debug!(student_id, class_id, "student enrolled");
        Ok(())
    }

    pub fn is_enrolled(&self, student_id: i64, class_id: i64) -> RecordResult<bool> {
        let row = self.store.query_one(
            "SELECT 1 FROM enrollments WHERE student_id = ? AND class_id = ? LIMIT 1",
            &[Value::Integer(student_id), Value::Integer(class_id)],
        )?;
        Ok(row.is_some())
    }

    /// All enrollments, optionally narrowed to classes with the given name.
    pub fn list(&self, class_name: Option<&str>) -> RecordResult<Vec<EnrollmentListing>> {
        let (sql, params) = FilteredQuery::new(LISTING_BASE, LISTING_ORDER)
            .filter_eq("c.name", class_name.map(str::to_string))
            .build();
        let rows = fetch_all(self.store, &sql, &params, EnrollmentListing::from_row)?;
        debug!(count = rows.len(), ?class_name, "fetched enrollments");
        Ok(rows)
    }

    /// Students enrolled in one class, ordered by name.
    pub fn roster(&self, class_id: i64) -> RecordResult<Vec<RosterEntry>> {
        fetch_all(
            self.store,
            "SELECT DISTINCT s.id, s.full_name
             FROM students s
             JOIN enrollments e ON e.student_id = s.id
             WHERE e.class_id = ?
             ORDER BY s.full_name, s.id",
            &[Value::Integer(class_id)],
            |row| {
                Ok(RosterEntry {
                    student_id: row.int(0)?,
                    full_name: row.text(1)?,
                })
            },
        )
    }

    pub fn withdraw(&self, student_id: i64, class_id: i64) -> RecordResult<bool> {
        delete_rows(
            self.store,
            Entity::Enrollment,
            "DELETE FROM enrollments WHERE student_id = ? AND class_id = ?",
            &[Value::Integer(student_id), Value::Integer(class_id)],
        )
    }

    /// Name-keyed withdrawal. Fails with `Ambiguous` when several classes share `class_name`.
    pub fn withdraw_by_class_name(&self, student_id: i64, class_name: &str) -> RecordResult<bool> {
        let class_id = super::Classes::new(self.store).id_by_name(class_name)?;
        self.withdraw(student_id, class_id)
    }

    /// Moves a student from one class to another in a single transaction.
    pub fn transfer(&self, student_id: i64, from_class: i64, to_class: i64) -> RecordResult<()> {
        with_transaction(self.store, || {
            if !self.withdraw(student_id, from_class)? {
                return Err(RecordError::not_found(
                    Entity::Enrollment,
                    format!("student {student_id} in class {from_class}"),
                ));
            }
            if self.is_enrolled(student_id, to_class)? {
                return Ok(());
            }
            self.enroll(student_id, to_class)
        })?;
        info!(student_id, from_class, to_class, "enrollment transferred");
        Ok(())
    }
}
