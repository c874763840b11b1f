use serde_json::json;

use crate::ipc::helpers::{
    finish, found, id_or_name, parse_params, record, required_i64, store, Reply,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{ClassInput, Entity};
use crate::repo::Repository;
use crate::store::SqliteStore;

fn repo(store: &SqliteStore) -> Repository<'_, SqliteStore> {
    Repository::new(store)
}

fn handle_classes_list(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let classes = record(req, repo(store).classes().list())?;
    Ok(json!({ "classes": classes }))
}

/// Classes with the teacher's name resolved; `teacherName` is null when unassigned.
fn handle_classes_overview(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let classes = record(req, repo(store).classes().overview())?;
    Ok(json!({ "classes": classes }))
}

fn handle_classes_get(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "classId")?;
    let class = record(req, repo(store).classes().get(id))?;
    let class = found(req, Entity::Class, id, class)?;
    Ok(json!({ "class": class }))
}

fn handle_classes_create(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let input: ClassInput = parse_params(req)?;
    let id = record(req, repo(store).classes().add(&input))?;
    Ok(json!({ "classId": id }))
}

fn handle_classes_update(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "classId")?;
    let input: ClassInput = parse_params(req)?;
    record(req, repo(store).classes().update(id, &input))?;
    Ok(json!({ "ok": true }))
}

fn handle_classes_delete(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "classId")?;
    let deleted = record(req, repo(store).classes().delete(id))?;
    Ok(json!({ "ok": true, "deleted": deleted }))
}

fn handle_classes_assign_teacher(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let class_id = required_i64(req, "classId")?;
    let teacher_id = id_or_name(req, "teacherId", "teacherName", |name| {
        repo(store).teachers().id_by_name(name)
    })?;
    record(req, repo(store).classes().assign_teacher(class_id, teacher_id))?;
    Ok(json!({ "ok": true, "teacherId": teacher_id }))
}

fn handle_classes_assign_subject(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let class_id = required_i64(req, "classId")?;
    let subject_id = id_or_name(req, "subjectId", "subjectName", |name| {
        repo(store).subjects().id_by_name(name)
    })?;
    record(req, repo(store).classes().assign_subject(class_id, subject_id))?;
    Ok(json!({ "ok": true, "subjectId": subject_id }))
}

fn handle_classes_subjects(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let class_id = required_i64(req, "classId")?;
    let subjects = record(req, repo(store).classes().subjects(class_id))?;
    Ok(json!({ "subjects": subjects }))
}

fn handle_classes_roster(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let class_id = required_i64(req, "classId")?;
    let students = record(req, repo(store).enrollments().roster(class_id))?;
    Ok(json!({ "students": students }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let reply = match req.method.as_str() {
        "classes.list" => handle_classes_list(state, req),
        "classes.overview" => handle_classes_overview(state, req),
        "classes.get" => handle_classes_get(state, req),
        "classes.create" => handle_classes_create(state, req),
        "classes.update" => handle_classes_update(state, req),
        "classes.delete" => handle_classes_delete(state, req),
        "classes.assignTeacher" => handle_classes_assign_teacher(state, req),
        "classes.assignSubject" => handle_classes_assign_subject(state, req),
        "classes.subjects" => handle_classes_subjects(state, req),
        "classes.roster" => handle_classes_roster(state, req),
        _ => return None,
    };
    Some(finish(req, reply))
}
