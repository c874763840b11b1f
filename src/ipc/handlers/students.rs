use serde_json::json;

use crate::ipc::helpers::{
    finish, found, parse_params, record, required_i64, store, Reply, StudentParams,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Entity;
use crate::repo::Repository;

fn handle_students_list(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let students = record(req, Repository::new(store).students().list())?;
    Ok(json!({ "students": students }))
}

fn handle_students_get(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "studentId")?;
    let student = record(req, Repository::new(store).students().get(id))?;
    let student = found(req, Entity::Student, id, student)?;
    Ok(json!({ "student": student }))
}

fn handle_students_create(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let params: StudentParams = parse_params(req)?;
    let input = record(req, params.into_input())?;
    let id = record(req, Repository::new(store).students().add(&input))?;
    Ok(json!({ "studentId": id }))
}

fn handle_students_update(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "studentId")?;
    let params: StudentParams = parse_params(req)?;
    let input = record(req, params.into_input())?;
    record(req, Repository::new(store).students().update(id, &input))?;
    Ok(json!({ "ok": true }))
}

fn handle_students_delete(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "studentId")?;
    let deleted = record(req, Repository::new(store).students().delete(id))?;
    Ok(json!({ "ok": true, "deleted": deleted }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let reply = match req.method.as_str() {
        "students.list" => handle_students_list(state, req),
        "students.get" => handle_students_get(state, req),
        "students.create" => handle_students_create(state, req),
        "students.update" => handle_students_update(state, req),
        "students.delete" => handle_students_delete(state, req),
        _ => return None,
    };
    Some(finish(req, reply))
}
