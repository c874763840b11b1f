use crate::error::RecordResult;
use crate::model::{optional_text, required_name, Entity, Subject, SubjectInput};
use crate::store::{Store, Value};

use super::{
    delete_rows, fetch_all, fetch_one, insert_returning_id, nullable_text, resolve_unique, text,
    write_existing,
};

pub struct Subjects<'a, S: ?Sized> {
    store: &'a S,
}

fn bind_input(input: &SubjectInput) -> RecordResult<Vec<Value>> {
    let name = required_name("name", &input.name)?;
    Ok(vec![
        text(&name),
        nullable_text(optional_text(input.description.as_deref())),
    ])
}

impl<'a, S: Store + ?Sized> Subjects<'a, S> {
    pub(super) fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn add(&self, input: &SubjectInput) -> RecordResult<i64> {
        let params = bind_input(input)?;
        insert_returning_id(
            self.store,
            Entity::Subject,
            "INSERT INTO subjects(name, description) VALUES(?, ?) RETURNING id",
            &params,
        )
    }

    pub fn list(&self) -> RecordResult<Vec<Subject>> {
        fetch_all(
            self.store,
            "SELECT id, name, description FROM subjects ORDER BY id",
            &[],
            Subject::from_row,
        )
    }

    pub fn get(&self, id: i64) -> RecordResult<Option<Subject>> {
        fetch_one(
            self.store,
            "SELECT id, name, description FROM subjects WHERE id = ?",
            &[Value::Integer(id)],
            Subject::from_row,
        )
    }

    pub fn update(&self, id: i64, input: &SubjectInput) -> RecordResult<()> {
        let mut params = bind_input(input)?;
        params.push(Value::Integer(id));
        write_existing(
            self.store,
            Entity::Subject,
            id,
            "UPDATE subjects SET name = ?, description = ? WHERE id = ?",
            &params,
        )
    }

    pub fn delete(&self, id: i64) -> RecordResult<bool> {
        delete_rows(
            self.store,
            Entity::Subject,
            "DELETE FROM subjects WHERE id = ?",
            &[Value::Integer(id)],
        )
    }

    pub fn id_by_name(&self, name: &str) -> RecordResult<i64> {
        resolve_unique(
            self.store,
            Entity::Subject,
            "SELECT id FROM subjects WHERE name = ? ORDER BY id",
            name,
        )
    }
}
