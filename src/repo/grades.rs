use tracing::debug;

use crate::error::RecordResult;
use crate::model::{validate_grade, Entity, Grade, GradeInput, GradeListing};
use crate::query::FilteredQuery;
use crate::store::{Store, Value};

use super::{delete_rows, fetch_all, fetch_one, insert_returning_id, write_existing};

const LISTING_BASE: &str = "SELECT g.id, s.full_name, c.name, sub.name, g.value
    FROM grades g
    JOIN students s ON s.id = g.student_id
    JOIN classes c ON c.id = g.class_id
    JOIN subjects sub ON sub.id = g.subject_id";
const LISTING_ORDER: &str = "s.full_name, sub.name, g.id";

/// Optional equality filters for the grade listing. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeFilter {
    pub class_name: Option<String>,
    pub subject_name: Option<String>,
}

pub struct Grades<'a, S: ?Sized> {
    store: &'a S,
}

fn bind_input(input: &GradeInput) -> RecordResult<Vec<Value>> {
    let value = validate_grade(input.value)?;
    Ok(vec![
        Value::Integer(input.student_id),
        Value::Integer(input.class_id),
        Value::Integer(input.subject_id),
        Value::Real(value),
    ])
}

impl<'a, S: Store + ?Sized> Grades<'a, S> {
    pub(super) fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Records a grade. Values outside [0, 100] never reach the store.
    pub fn add(&self, input: &GradeInput) -> RecordResult<i64> {
        let params = bind_input(input)?;
        insert_returning_id(
            self.store,
            Entity::Grade,
            "INSERT INTO grades(student_id, class_id, subject_id, value)
             VALUES(?, ?, ?, ?)
             RETURNING id",
            &params,
        )
    }

    pub fn list(&self) -> RecordResult<Vec<Grade>> {
        fetch_all(
            self.store,
            "SELECT id, student_id, class_id, subject_id, value FROM grades ORDER BY id",
            &[],
            Grade::from_row,
        )
    }

    pub fn get(&self, id: i64) -> RecordResult<Option<Grade>> {
        fetch_one(
            self.store,
            "SELECT id, student_id, class_id, subject_id, value FROM grades WHERE id = ?",
            &[Value::Integer(id)],
            Grade::from_row,
        )
    }

    /// Joined listing narrowed by whichever filters are set.
    pub fn list_filtered(&self, filter: &GradeFilter) -> RecordResult<Vec<GradeListing>> {
        let (sql, params) = FilteredQuery::new(LISTING_BASE, LISTING_ORDER)
            .filter_eq("c.name", filter.class_name.clone())
            .filter_eq("sub.name", filter.subject_name.clone())
            .build();
        let rows = fetch_all(self.store, &sql, &params, GradeListing::from_row)?;
        debug!(count = rows.len(), ?filter, "fetched grades");
        Ok(rows)
    }

    pub fn update(&self, id: i64, input: &GradeInput) -> RecordResult<()> {
        let mut params = bind_input(input)?;
        params.push(Value::Integer(id));
        write_existing(
            self.store,
            Entity::Grade,
            id,
            "UPDATE grades SET student_id = ?, class_id = ?, subject_id = ?, value = ? WHERE id = ?",
            &params,
        )
    }

    pub fn delete(&self, id: i64) -> RecordResult<bool> {
        delete_rows(
            self.store,
            Entity::Grade,
            "DELETE FROM grades WHERE id = ?",
            &[Value::Integer(id)],
        )
    }
}
