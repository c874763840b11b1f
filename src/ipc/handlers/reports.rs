use serde::Serialize;
use serde_json::json;

use crate::error::RecordResult;
use crate::ipc::error::err;
use crate::ipc::helpers::{finish, optional_i64, optional_str, record, store, Reply};
use crate::ipc::types::{AppState, Request};
use crate::reports::Reports;

/// Runs the id-keyed report when `<idKey>` is present, otherwise the name-keyed one.
fn keyed_report<T: Serialize>(
    req: &Request,
    id_key: &str,
    name_key: &str,
    by_id: impl FnOnce(i64) -> RecordResult<Vec<T>>,
    by_name: impl FnOnce(&str) -> RecordResult<Vec<T>>,
) -> Reply {
    let rows = if let Some(id) = optional_i64(req, id_key)? {
        record(req, by_id(id))?
    } else if let Some(name) = optional_str(req, name_key) {
        record(req, by_name(name))?
    } else {
        return Err(err(
            &req.id,
            "bad_params",
            format!("missing {id_key} or {name_key}"),
            None,
        ));
    };
    Ok(json!({ "rows": rows }))
}

fn handle_class_performance(state: &AppState, req: &Request) -> Reply {
    let reports = Reports::new(store(state, req)?);
    keyed_report(
        req,
        "classId",
        "className",
        |id| reports.class_performance(id),
        |name| reports.class_performance_by_name(name),
    )
}

fn handle_teacher_load(state: &AppState, req: &Request) -> Reply {
    let reports = Reports::new(store(state, req)?);
    keyed_report(
        req,
        "teacherId",
        "teacherName",
        |id| reports.teacher_load(id),
        |name| reports.teacher_load_by_name(name),
    )
}

fn handle_student_performance(state: &AppState, req: &Request) -> Reply {
    let reports = Reports::new(store(state, req)?);
    keyed_report(
        req,
        "studentId",
        "studentName",
        |id| reports.student_performance(id),
        |name| reports.student_performance_by_name(name),
    )
}

fn handle_class_averages(state: &AppState, req: &Request) -> Reply {
    let rows = record(req, Reports::new(store(state, req)?).class_averages())?;
    Ok(json!({ "rows": rows }))
}

fn handle_subject_averages(state: &AppState, req: &Request) -> Reply {
    let rows = record(req, Reports::new(store(state, req)?).subject_averages())?;
    Ok(json!({ "rows": rows }))
}

fn handle_gender_distribution(state: &AppState, req: &Request) -> Reply {
    let rows = record(req, Reports::new(store(state, req)?).gender_distribution())?;
    Ok(json!({ "rows": rows }))
}

fn handle_enrollment_distribution(state: &AppState, req: &Request) -> Reply {
    let rows = record(req, Reports::new(store(state, req)?).enrollment_distribution())?;
    Ok(json!({ "rows": rows }))
}

fn handle_grade_distribution(state: &AppState, req: &Request) -> Reply {
    let rows = record(req, Reports::new(store(state, req)?).grade_distribution())?;
    Ok(json!({ "rows": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let reply = match req.method.as_str() {
        "reports.classPerformance" => handle_class_performance(state, req),
        "reports.teacherLoad" => handle_teacher_load(state, req),
        "reports.studentPerformance" => handle_student_performance(state, req),
        "reports.classAverages" => handle_class_averages(state, req),
        "reports.subjectAverages" => handle_subject_averages(state, req),
        "reports.genderDistribution" => handle_gender_distribution(state, req),
        "reports.enrollmentDistribution" => handle_enrollment_distribution(state, req),
        "reports.gradeDistribution" => handle_grade_distribution(state, req),
        _ => return None,
    };
    Some(finish(req, reply))
}
