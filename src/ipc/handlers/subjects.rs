use serde_json::json;

use crate::ipc::helpers::{finish, found, parse_params, record, required_i64, store, Reply};
use crate::ipc::types::{AppState, Request};
use crate::model::{Entity, SubjectInput};
use crate::repo::Repository;

fn handle_subjects_list(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let subjects = record(req, Repository::new(store).subjects().list())?;
    Ok(json!({ "subjects": subjects }))
}

fn handle_subjects_get(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "subjectId")?;
    let subject = record(req, Repository::new(store).subjects().get(id))?;
    let subject = found(req, Entity::Subject, id, subject)?;
    Ok(json!({ "subject": subject }))
}

fn handle_subjects_create(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let input: SubjectInput = parse_params(req)?;
    let id = record(req, Repository::new(store).subjects().add(&input))?;
    Ok(json!({ "subjectId": id }))
}

fn handle_subjects_update(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "subjectId")?;
    let input: SubjectInput = parse_params(req)?;
    record(req, Repository::new(store).subjects().update(id, &input))?;
    Ok(json!({ "ok": true }))
}

fn handle_subjects_delete(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let id = required_i64(req, "subjectId")?;
    let deleted = record(req, Repository::new(store).subjects().delete(id))?;
    Ok(json!({ "ok": true, "deleted": deleted }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let reply = match req.method.as_str() {
        "subjects.list" => handle_subjects_list(state, req),
        "subjects.get" => handle_subjects_get(state, req),
        "subjects.create" => handle_subjects_create(state, req),
        "subjects.update" => handle_subjects_update(state, req),
        "subjects.delete" => handle_subjects_delete(state, req),
        _ => return None,
    };
    Some(finish(req, reply))
}
