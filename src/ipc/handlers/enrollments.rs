use serde_json::json;

use crate::ipc::error::err;
use crate::ipc::helpers::{
    finish, name_filter, optional_i64, record, required_i64, required_str, store, Reply,
};
use crate::ipc::types::{AppState, Request};
use crate::repo::Repository;

const CLASS_SENTINELS: &[&str] = &["All Classes", "All"];

fn handle_enrollments_list(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let class_name = name_filter(req, "className", CLASS_SENTINELS);
    let enrollments = record(req, Repository::new(store).enrollments().list(class_name))?;
    Ok(json!({ "enrollments": enrollments }))
}

fn handle_enrollments_create(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let student_id = required_i64(req, "studentId")?;
    let class_id = required_i64(req, "classId")?;
    let enrollments = Repository::new(store).enrollments();
    if record(req, enrollments.is_enrolled(student_id, class_id))? {
        return Err(err(
            &req.id,
            "already_enrolled",
            format!("student {student_id} is already enrolled in class {class_id}"),
            Some(json!({ "studentId": student_id, "classId": class_id })),
        ));
    }
    record(req, enrollments.enroll(student_id, class_id))?;
    Ok(json!({ "ok": true }))
}

fn handle_enrollments_delete(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let student_id = required_i64(req, "studentId")?;
    let enrollments = Repository::new(store).enrollments();
    let deleted = match optional_i64(req, "classId")? {
        Some(class_id) => record(req, enrollments.withdraw(student_id, class_id))?,
        None => {
            let class_name = required_str(req, "className")?;
            record(req, enrollments.withdraw_by_class_name(student_id, class_name))?
        }
    };
    Ok(json!({ "ok": true, "deleted": deleted }))
}

fn handle_enrollments_transfer(state: &AppState, req: &Request) -> Reply {
    let store = store(state, req)?;
    let student_id = required_i64(req, "studentId")?;
    let from_class = required_i64(req, "fromClassId")?;
    let to_class = required_i64(req, "toClassId")?;
    record(
        req,
        Repository::new(store)
            .enrollments()
            .transfer(student_id, from_class, to_class),
    )?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let reply = match req.method.as_str() {
        "enrollments.list" => handle_enrollments_list(state, req),
        "enrollments.create" => handle_enrollments_create(state, req),
        "enrollments.delete" => handle_enrollments_delete(state, req),
        "enrollments.transfer" => handle_enrollments_transfer(state, req),
        _ => return None,
    };
    Some(finish(req, reply))
}
