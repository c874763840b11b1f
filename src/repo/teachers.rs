use tracing::debug;

use crate::error::RecordResult;
use crate::model::{optional_text, required_name, Entity, Teacher, TeacherInput};
use crate::store::{Store, Value};

use super::{
    delete_rows, fetch_all, fetch_one, insert_returning_id, nullable_text, resolve_unique, text,
    write_existing,
};

pub struct Teachers<'a, S: ?Sized> {
    store: &'a S,
}

fn bind_input(input: &TeacherInput) -> RecordResult<Vec<Value>> {
    let name = required_name("fullName", &input.full_name)?;
    Ok(vec![
        text(&name),
        nullable_text(optional_text(input.department.as_deref())),
        nullable_text(optional_text(input.email.as_deref())),
        nullable_text(optional_text(input.phone.as_deref())),
    ])
}

impl<'a, S: Store + ?Sized> Teachers<'a, S> {
    pub(super) fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn add(&self, input: &TeacherInput) -> RecordResult<i64> {
        let params = bind_input(input)?;
        insert_returning_id(
            self.store,
            Entity::Teacher,
            "INSERT INTO teachers(full_name, department, email, phone)
             VALUES(?, ?, ?, ?)
             RETURNING id",
            &params,
        )
    }

    pub fn list(&self) -> RecordResult<Vec<Teacher>> {
        let teachers = fetch_all(
            self.store,
            "SELECT id, full_name, department, email, phone FROM teachers ORDER BY id",
            &[],
            Teacher::from_row,
        )?;
        debug!(count = teachers.len(), "fetched teachers");
        Ok(teachers)
    }

    pub fn get(&self, id: i64) -> RecordResult<Option<Teacher>> {
        fetch_one(
            self.store,
            "SELECT id, full_name, department, email, phone FROM teachers WHERE id = ?",
            &[Value::Integer(id)],
            Teacher::from_row,
        )
    }

    pub fn update(&self, id: i64, input: &TeacherInput) -> RecordResult<()> {
        let mut params = bind_input(input)?;
        params.push(Value::Integer(id));
        write_existing(
            self.store,
            Entity::Teacher,
            id,
            "UPDATE teachers SET full_name = ?, department = ?, email = ?, phone = ? WHERE id = ?",
            &params,
        )
    }

    /// Fails with `Referential` while a class still names this teacher.
    pub fn delete(&self, id: i64) -> RecordResult<bool> {
        delete_rows(
            self.store,
            Entity::Teacher,
            "DELETE FROM teachers WHERE id = ?",
            &[Value::Integer(id)],
        )
    }

    pub fn id_by_name(&self, full_name: &str) -> RecordResult<i64> {
        resolve_unique(
            self.store,
            Entity::Teacher,
            "SELECT id FROM teachers WHERE full_name = ? ORDER BY id",
            full_name,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordError;
    use crate::model::ClassInput;
    use crate::repo::testing::store;
    use crate::repo::Repository;

    fn teacher(name: &str) -> TeacherInput {
        TeacherInput {
            full_name: name.to_string(),
            department: Some("Science".into()),
            email: None,
            phone: None,
        }
    }

    #[test]
    fn list_is_ordered_by_id() {
        let store = store();
        let repo = Repository::new(&store);
        let zed = repo.teachers().add(&teacher("Zed Young")).expect("zed");
        let amy = repo.teachers().add(&teacher("Amy Adams")).expect("amy");
        let ids: Vec<i64> = repo
            .teachers()
            .list()
            .expect("list")
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![zed, amy]);
    }

    #[test]
    fn crud_cycle() {
        let store = store();
        let repo = Repository::new(&store);
        let id = repo.teachers().add(&teacher("Ms. Curie")).expect("add");
        let got = repo.teachers().get(id).expect("get").expect("row");
        assert_eq!(got.department.as_deref(), Some("Science"));

        let mut changed = teacher("Ms. Curie");
        changed.department = None;
        changed.phone = Some("555-0100".into());
        repo.teachers().update(id, &changed).expect("update");
        let got = repo.teachers().get(id).expect("get").expect("row");
        assert_eq!(got.department, None);
        assert_eq!(got.phone.as_deref(), Some("555-0100"));

        assert!(repo.teachers().delete(id).expect("delete"));
        assert!(repo.teachers().list().expect("list").is_empty());
    }

    #[test]
    fn deleting_a_teacher_still_assigned_is_referential() {
        let store = store();
        let repo = Repository::new(&store);
        let id = repo.teachers().add(&teacher("Mr. Fermi")).expect("add");
        repo.classes()
            .add(&ClassInput {
                name: "Physics".into(),
                teacher_id: Some(id),
            })
            .expect("class");
        let e = repo.teachers().delete(id).expect_err("still referenced");
        assert!(matches!(e, RecordError::Referential { .. }));
        assert!(repo.teachers().get(id).expect("get").is_some());
    }
}
