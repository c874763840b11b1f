use serde_json::json;

use crate::ipc::helpers::{finish, found, parse_params, record, required_i64, store, Reply};
use crate::ipc::types::{AppState, Request};
use crate::model::{Entity, TeacherInput};
use crate::repo::Repository;

fn handle_teachers_list(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let teachers = record(req, Repository::new(store).teachers().list())?;
    Ok(json!({ "teachers": teachers }))
}

fn handle_teachers_get(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "teacherId")?;
    let teacher = record(req, Repository::new(store).teachers().get(id))?;
    let teacher = found(req, Entity::Teacher, id, teacher)?;
    Ok(json!({ "teacher": teacher }))
}

fn handle_teachers_create(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let input: TeacherInput = parse_params(req)?;
    let id = record(req, Repository::new(store).teachers().add(&input))?;
    Ok(json!({ "teacherId": id }))
}

fn handle_teachers_update(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "teacherId")?;
    let input: TeacherInput = parse_params(req)?;
    record(req, Repository::new(store).teachers().update(id, &input))?;
    Ok(json!({ "ok": true }))
}

fn handle_teachers_delete(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "teacherId")?;
    let deleted = record(req, Repository::new(store).teachers().delete(id))?;
    Ok(json!({ "ok": true, "deleted": deleted }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let reply = match req.method.as_str() {
        "teachers.list" => handle_teachers_list(state, req),
        "teachers.get" => handle_teachers_get(state, req),
        "teachers.create" => handle_teachers_create(state, req),
        "teachers.update" => handle_teachers_update(state, req),
        "teachers.delete" => handle_teachers_delete(state, req),
        _ => return None,
    };
    Some(finish(req, reply))
}
