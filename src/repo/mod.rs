//! Typed CRUD over the school records, one submodule per entity.
//!
//! Every operation goes through the borrowed `Store`; nothing here holds a
//! connection of its own.

mod classes;
mod enrollments;
mod grades;
mod lookup;
mod students;
mod subjects;
mod teachers;

pub use classes::Classes;
pub use enrollments::Enrollments;
pub use grades::{GradeFilter, Grades};
use lookup::resolve_unique;
pub use students::Students;
pub use subjects::Subjects;
pub use teachers::Teachers;

use crate::error::{RecordError, RecordResult, StoreError};
use crate::model::Entity;
use crate::store::{Row, Store, Value};

pub struct Repository<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> Repository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn students(&self) -> Students<'a, S> {
        Students::new(self.store)
    }

    pub fn teachers(&self) -> Teachers<'a, S> {
        Teachers::new(self.store)
    }

    pub fn classes(&self) -> Classes<'a, S> {
        Classes::new(self.store)
    }

    pub fn subjects(&self) -> Subjects<'a, S> {
        Subjects::new(self.store)
    }

    pub fn enrollments(&self) -> Enrollments<'a, S> {
        Enrollments::new(self.store)
    }

    pub fn grades(&self) -> Grades<'a, S> {
        Grades::new(self.store)
    }
}

pub(crate) fn text(v: &str) -> Value {
    Value::Text(v.to_string())
}

pub(crate) fn nullable_text(v: Option<String>) -> Value {
    v.map(Value::Text).unwrap_or(Value::Null)
}

pub(crate) fn nullable_int(v: Option<i64>) -> Value {
    v.map(Value::Integer).unwrap_or(Value::Null)
}

/// Runs an `INSERT ... RETURNING id` and hands back the store-generated id.
pub(crate) fn insert_returning_id<S: Store + ?Sized>(
    store: &S,
    entity: Entity,
    sql: &str,
    params: &[Value],
) -> RecordResult<i64> {
    let row = store
        .query_one(sql, params)
        .map_err(|e| RecordError::from_write(entity, e))?
        .ok_or_else(|| StoreError::Statement(format!("{entity} insert returned no id")))?;
    Ok(row.int(0)?)
}

/// Executes a write that must touch exactly the row keyed by `key`.
pub(crate) fn write_existing<S: Store + ?Sized>(
    store: &S,
    entity: Entity,
    key: impl ToString,
    sql: &str,
    params: &[Value],
) -> RecordResult<()> {
    let changed = store
        .execute(sql, params)
        .map_err(|e| RecordError::from_write(entity, e))?;
    if changed == 0 {
        return Err(RecordError::not_found(entity, key));
    }
    Ok(())
}

/// Unconditional delete; the flag reports whether anything was removed.
pub(crate) fn delete_rows<S: Store + ?Sized>(
    store: &S,
    entity: Entity,
    sql: &str,
    params: &[Value],
) -> RecordResult<bool> {
    let changed = store
        .execute(sql, params)
        .map_err(|e| RecordError::from_write(entity, e))?;
    Ok(changed > 0)
}

pub(crate) fn fetch_all<S, T>(
    store: &S,
    sql: &str,
    params: &[Value],
    decode: impl Fn(&Row) -> Result<T, StoreError>,
) -> RecordResult<Vec<T>>
where
    S: Store + ?Sized,
{
    let rows = store.query_all(sql, params)?;
    let out = rows
        .iter()
        .map(decode)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(out)
}

pub(crate) fn fetch_one<S, T>(
    store: &S,
    sql: &str,
    params: &[Value],
    decode: impl Fn(&Row) -> Result<T, StoreError>,
) -> RecordResult<Option<T>>
where
    S: Store + ?Sized,
{
    match store.query_one(sql, params)? {
        Some(row) => Ok(Some(decode(&row)?)),
        None => Ok(None),
    }
}
