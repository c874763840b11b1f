use serde_json::json;

use crate::ipc::helpers::{
    finish, found, name_filter, parse_params, record, required_i64, store, Reply,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Entity, GradeInput};
use crate::repo::{GradeFilter, Repository};

const ALL: &[&str] = &["All"];

fn handle_grades_list(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let filter = GradeFilter {
        class_name: name_filter(req, "className", ALL).map(str::to_string),
        subject_name: name_filter(req, "subjectName", ALL).map(str::to_string),
    };
    let grades = record(req, Repository::new(store).grades().list_filtered(&filter))?;
    Ok(json!({ "grades": grades }))
}

/// Raw grade rows keyed by id, without the joined names.
fn handle_grades_records(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let grades = record(req, Repository::new(store).grades().list())?;
    Ok(json!({ "grades": grades }))
}

fn handle_grades_get(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "gradeId")?;
    let grade = record(req, Repository::new(store).grades().get(id))?;
    let grade = found(req, Entity::Grade, id, grade)?;
    Ok(json!({ "grade": grade }))
}

fn handle_grades_create(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let input: GradeInput = parse_params(req)?;
    let id = record(req, Repository::new(store).grades().add(&input))?;
    Ok(json!({ "gradeId": id }))
}

fn handle_grades_update(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "gradeId")?;
    let input: GradeInput = parse_params(req)?;
    record(req, Repository::new(store).grades().update(id, &input))?;
    Ok(json!({ "ok": true }))
}

fn handle_grades_delete(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "gradeId")?;
    let deleted = record(req, Repository::new(store).grades().delete(id))?;
    Ok(json!({ "ok": true, "deleted": deleted }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let reply = match req.method.as_str() {
        "grades.list" => handle_grades_list(state, req),
        "grades.records" => handle_grades_records(state, req),
        "grades.get" => handle_grades_get(state, req),
        "grades.create" => handle_grades_create(state, req),
        "grades.update" => handle_grades_update(state, req),
        "grades.delete" => handle_grades_delete(state, req),
        _ => return None,
    };
    Some(finish(req, reply))
}
