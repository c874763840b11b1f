use tracing::debug;

use crate::error::{RecordError, RecordResult};
use crate::model::{required_name, Class, ClassInput, ClassOverview, Entity, Subject};
use crate::store::{Store, Value};

use super::{
    delete_rows, fetch_all, fetch_one, insert_returning_id, nullable_int, resolve_unique, text,
    write_existing,
};

pub struct Classes<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> Classes<'a, S> {
    pub(super) fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Inserts a class. A `teacher_id` that matches no teacher is rejected as `Referential`.
    pub fn add(&self, input: &ClassInput) -> RecordResult<i64> {
        let name = required_name("name", &input.name)?;
        insert_returning_id(
            self.store,
            Entity::Class,
            "INSERT INTO classes(name, teacher_id) VALUES(?, ?) RETURNING id",
            &[text(&name), nullable_int(input.teacher_id)],
        )
    }

    pub fn list(&self) -> RecordResult<Vec<Class>> {
        fetch_all(
            self.store,
            "SELECT id, name, teacher_id FROM classes ORDER BY id",
            &[],
            Class::from_row,
        )
    }

    /// Classes with their teacher's name (`None` when unassigned), ordered by id.
    pub fn overview(&self) -> RecordResult<Vec<ClassOverview>> {
        let classes = fetch_all(
            self.store,
            "SELECT c.id, c.name, t.full_name
             FROM classes c
             LEFT JOIN teachers t ON t.id = c.teacher_id
             ORDER BY c.id",
            &[],
            |row| {
                Ok(ClassOverview {
                    id: row.int(0)?,
                    name: row.text(1)?,
                    teacher_name: row.opt_text(2)?,
                })
            },
        )?;
        debug!(count = classes.len(), "fetched classes");
        Ok(classes)
    }

    pub fn get(&self, id: i64) -> RecordResult<Option<Class>> {
        fetch_one(
            self.store,
            "SELECT id, name, teacher_id FROM classes WHERE id = ?",
            &[Value::Integer(id)],
            Class::from_row,
        )
    }

    pub fn update(&self, id: i64, input: &ClassInput) -> RecordResult<()> {
        let name = required_name("name", &input.name)?;
        write_existing(
            self.store,
            Entity::Class,
            id,
            "UPDATE classes SET name = ?, teacher_id = ? WHERE id = ?",
            &[text(&name), nullable_int(input.teacher_id), Value::Integer(id)],
        )
    }

    pub fn delete(&self, id: i64) -> RecordResult<bool> {
        delete_rows(
            self.store,
            Entity::Class,
            "DELETE FROM classes WHERE id = ?",
            &[Value::Integer(id)],
        )
    }

    pub fn assign_teacher(&self, class_id: i64, teacher_id: i64) -> RecordResult<()> {
        write_existing(
            self.store,
            Entity::Class,
            class_id,
            "UPDATE classes SET teacher_id = ? WHERE id = ?",
            &[Value::Integer(teacher_id), Value::Integer(class_id)],
        )
    }

    /// Links a subject to a class. Repeating the call adds another identical link.
    pub fn assign_subject(&self, class_id: i64, subject_id: i64) -> RecordResult<()> {
        self.store
            .execute(
                "INSERT INTO class_subjects(class_id, subject_id) VALUES(?, ?)",
                &[Value::Integer(class_id), Value::Integer(subject_id)],
            )
            .map_err(|e| RecordError::from_write(Entity::ClassSubject, e))?;
        Ok(())
    }

    /// Distinct subjects linked to a class, ordered by name.
    pub fn subjects(&self, class_id: i64) -> RecordResult<Vec<Subject>> {
        fetch_all(
            self.store,
            "SELECT DISTINCT s.id, s.name, s.description
             FROM subjects s
             JOIN class_subjects cs ON cs.subject_id = s.id
             WHERE cs.class_id = ?
             ORDER BY s.name, s.id",
            &[Value::Integer(class_id)],
            Subject::from_row,
        )
    }

    pub fn id_by_name(&self, name: &str) -> RecordResult<i64> {
        resolve_unique(
            self.store,
            Entity::Class,
            "SELECT id FROM classes WHERE name = ? ORDER BY id",
            name,
        )
    }
}
