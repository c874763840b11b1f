use tracing::debug;

use crate::error::{RecordError, RecordResult};
use crate::model::Entity;
use crate::store::Store;

use super::text;

/// Resolves a display name to the single id it denotes.
///
/// `sql` must select one id column and bind the name as its only parameter.
/// Zero matches is `NotFound`; more than one is `Ambiguous`, never "all of them".
pub fn resolve_unique<S: Store + ?Sized>(
    store: &S,
    entity: Entity,
    sql: &str,
    name: &str,
) -> RecordResult<i64> {
    let rows = store.query_all(sql, &[text(name)])?;
    debug!(%entity, name, matches = rows.len(), "resolve name");
    match rows.as_slice() {
        [] => Err(RecordError::not_found(entity, format!("{name:?}"))),
        [only] => Ok(only.int(0)?),
        many => Err(RecordError::Ambiguous {
            entity,
            name: name.to_string(),
            count: many.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TeacherInput;
    use crate::repo::testing::store;
    use crate::repo::Repository;

    const SQL: &str = "SELECT id FROM teachers WHERE full_name = ? ORDER BY id";

    fn teacher(name: &str) -> TeacherInput {
        TeacherInput {
            full_name: name.to_string(),
            department: None,
            email: None,
            phone: None,
        }
    }

    #[test]
    fn zero_one_and_many_matches() {
        let store = store();
        let repo = Repository::new(&store);

        let e = resolve_unique(&store, Entity::Teacher, SQL, "Sam Lee").expect_err("none");
        assert_eq!(e.code(), "not_found");

        let id = repo.teachers().add(&teacher("Sam Lee")).expect("add");
        assert_eq!(
            resolve_unique(&store, Entity::Teacher, SQL, "Sam Lee").expect("one"),
            id
        );

        repo.teachers().add(&teacher("Sam Lee")).expect("add twin");
        let e = resolve_unique(&store, Entity::Teacher, SQL, "Sam Lee").expect_err("two");
        assert!(matches!(e, RecordError::Ambiguous { count: 2, .. }));
    }
}
