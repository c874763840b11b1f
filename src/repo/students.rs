use tracing::debug;

use crate::error::RecordResult;
use crate::model::{optional_text, required_name, Entity, Student, StudentInput, DATE_FORMAT};
use crate::store::{Store, Value};

use super::{
    delete_rows, fetch_all, fetch_one, insert_returning_id, nullable_text, resolve_unique, text,
    write_existing,
};

pub struct Students<'a, S: ?Sized> {
    store: &'a S,
}

fn bind_input(input: &StudentInput) -> RecordResult<Vec<Value>> {
    let name = required_name("fullName", &input.full_name)?;
    Ok(vec![
        text(&name),
        Value::Text(input.date_of_birth.format(DATE_FORMAT).to_string()),
        text(input.gender.code()),
        nullable_text(optional_text(input.email.as_deref())),
        nullable_text(optional_text(input.phone.as_deref())),
        nullable_text(optional_text(input.address.as_deref())),
    ])
}

impl<'a, S: Store + ?Sized> Students<'a, S> {
    pub(super) fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn add(&self, input: &StudentInput) -> RecordResult<i64> {
        let params = bind_input(input)?;
        let id = insert_returning_id(
            self.store,
            Entity::Student,
            "INSERT INTO students(full_name, date_of_birth, gender, email, phone, address)
             VALUES(?, ?, ?, ?, ?, ?)
             RETURNING id",
            &params,
        )?;
        debug!(id, "student added");
        Ok(id)
    }

    pub fn list(&self) -> RecordResult<Vec<Student>> {
        let students = fetch_all(
            self.store,
            "SELECT id, full_name, date_of_birth, gender, email, phone, address
             FROM students
             ORDER BY id",
            &[],
            Student::from_row,
        )?;
        debug!(count = students.len(), "fetched students");
        Ok(students)
    }

    pub fn get(&self, id: i64) -> RecordResult<Option<Student>> {
        fetch_one(
            self.store,
            "SELECT id, full_name, date_of_birth, gender, email, phone, address
             FROM students
             WHERE id = ?",
            &[Value::Integer(id)],
            Student::from_row,
        )
    }

    pub fn update(&self, id: i64, input: &StudentInput) -> RecordResult<()> {
        let mut params = bind_input(input)?;
        params.push(Value::Integer(id));
        write_existing(
            self.store,
            Entity::Student,
            id,
            "UPDATE students
             SET full_name = ?, date_of_birth = ?, gender = ?, email = ?, phone = ?, address = ?
             WHERE id = ?",
            &params,
        )
    }

    pub fn delete(&self, id: i64) -> RecordResult<bool> {
        delete_rows(
            self.store,
            Entity::Student,
            "DELETE FROM students WHERE id = ?",
            &[Value::Integer(id)],
        )
    }

    pub fn id_by_name(&self, full_name: &str) -> RecordResult<i64> {
        resolve_unique(
            self.store,
            Entity::Student,
            "SELECT id FROM students WHERE full_name = ? ORDER BY id",
            full_name,
        )
    }
}
