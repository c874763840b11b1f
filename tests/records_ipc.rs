use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schoold");
    let mut child = Command::new(exe)
        .env_remove("SCHOOLD_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schoold");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn read_response(reader: &mut BufReader<ChildStdout>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response");
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let value = read_response(reader);
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value.get("error").cloned().expect("error object")
}

fn open_workspace(prefix: &str) -> (PathBuf, Child, ChildStdin, BufReader<ChildStdout>) {
    let workspace = temp_dir(prefix);
    let (child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    (workspace, child, stdin, reader)
}

#[test]
fn student_crud_validates_and_reports_missing_rows() {
    let (workspace, _child, mut stdin, mut reader) = open_workspace("schoold-students");

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({
            "fullName": "  Alice Smith ",
            "dateOfBirth": "2010-02-03",
            "gender": "F",
            "email": "alice@example.org",
            "phone": "   "
        }),
    );
    let alice = created["studentId"].as_i64().expect("studentId");

    let got = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.get",
        json!({ "studentId": alice }),
    );
    assert_eq!(got["student"]["fullName"], "Alice Smith");
    assert_eq!(got["student"]["dateOfBirth"], "2010-02-03");
    assert_eq!(got["student"]["gender"], "F");
    assert!(got["student"]["phone"].is_null());

    let bad_gender = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "fullName": "Bob", "dateOfBirth": "2010-02-03", "gender": "X" }),
    );
    assert_eq!(bad_gender["code"], "validation_failed");
    assert_eq!(bad_gender["details"]["field"], "gender");

    let bad_date = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "students.create",
        json!({ "fullName": "Bob", "dateOfBirth": "03/02/2010", "gender": "M" }),
    );
    assert_eq!(bad_date["code"], "validation_failed");

    let blank_name = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "students.create",
        json!({ "fullName": "   ", "dateOfBirth": "2010-02-03", "gender": "M" }),
    );
    assert_eq!(blank_name["code"], "validation_failed");

    let missing_field = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "students.create",
        json!({ "fullName": "Bob" }),
    );
    assert_eq!(missing_field["code"], "bad_params");

    let listed = request_ok(&mut stdin, &mut reader, "7", "students.list", json!({}));
    assert_eq!(listed["students"].as_array().map(|a| a.len()), Some(1));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "students.update",
        json!({
            "studentId": alice,
            "fullName": "Alice Jones",
            "dateOfBirth": "2010-02-03",
            "gender": "F"
        }),
    );
    let got = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "students.get",
        json!({ "studentId": alice }),
    );
    assert_eq!(got["student"]["fullName"], "Alice Jones");
    assert!(got["student"]["email"].is_null());

    let missing = request_err(
        &mut stdin,
        &mut reader,
        "10",
        "students.update",
        json!({
            "studentId": alice + 100,
            "fullName": "Nobody",
            "dateOfBirth": "2010-02-03",
            "gender": "F"
        }),
    );
    assert_eq!(missing["code"], "not_found");

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "students.delete",
        json!({ "studentId": alice }),
    );
    assert_eq!(deleted["deleted"], true);
    let again = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "students.delete",
        json!({ "studentId": alice }),
    );
    assert_eq!(again["deleted"], false);
    let gone = request_err(
        &mut stdin,
        &mut reader,
        "13",
        "students.get",
        json!({ "studentId": alice }),
    );
    assert_eq!(gone["code"], "not_found");

    drop(stdin);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn enrollment_rules_over_ipc() {
    let (workspace, _child, mut stdin, mut reader) = open_workspace("schoold-enrollments");

    let alice = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "fullName": "Alice", "dateOfBirth": "2010-01-01", "gender": "F" }),
    )["studentId"]
        .as_i64()
        .expect("alice");
    let math = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "classes.create",
        json!({ "name": "Math101" }),
    )["classId"]
        .as_i64()
        .expect("math");
    let choir_a = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "classes.create",
        json!({ "name": "Choir" }),
    )["classId"]
        .as_i64()
        .expect("choir a");
    let choir_b = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "classes.create",
        json!({ "name": "Choir" }),
    )["classId"]
        .as_i64()
        .expect("choir b");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "enrollments.create",
        json!({ "studentId": alice, "classId": math }),
    );
    let dup = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "enrollments.create",
        json!({ "studentId": alice, "classId": math }),
    );
    assert_eq!(dup["code"], "already_enrolled");

    let dangling = request_err(
        &mut stdin,
        &mut reader,
        "7",
        "enrollments.create",
        json!({ "studentId": alice, "classId": 9999 }),
    );
    assert_eq!(dangling["code"], "referential_violation");

    for (i, class_id) in [choir_a, choir_b].into_iter().enumerate() {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("choir-{i}"),
            "enrollments.create",
            json!({ "studentId": alice, "classId": class_id }),
        );
    }

    let math_only = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "enrollments.list",
        json!({ "className": "Math101" }),
    );
    assert_eq!(math_only["enrollments"].as_array().map(|a| a.len()), Some(1));
    let all = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "enrollments.list",
        json!({ "className": "All Classes" }),
    );
    assert_eq!(all["enrollments"].as_array().map(|a| a.len()), Some(3));

    let ambiguous = request_err(
        &mut stdin,
        &mut reader,
        "10",
        "enrollments.delete",
        json!({ "studentId": alice, "className": "Choir" }),
    );
    assert_eq!(ambiguous["code"], "ambiguous_name");
    assert_eq!(ambiguous["details"]["count"], 2);

    let by_id = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "enrollments.delete",
        json!({ "studentId": alice, "classId": choir_a }),
    );
    assert_eq!(by_id["deleted"], true);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "enrollments.transfer",
        json!({ "studentId": alice, "fromClassId": math, "toClassId": choir_a }),
    );
    let roster = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "classes.roster",
        json!({ "classId": choir_a }),
    );
    assert_eq!(roster["students"][0]["studentId"], alice);
    let math_roster = request_ok(
        &mut stdin,
        &mut reader,
        "14",
        "classes.roster",
        json!({ "classId": math }),
    );
    assert_eq!(math_roster["students"].as_array().map(|a| a.len()), Some(0));

    let blocked = request_err(
        &mut stdin,
        &mut reader,
        "15",
        "students.delete",
        json!({ "studentId": alice }),
    );
    assert_eq!(blocked["code"], "referential_violation");

    drop(stdin);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn grades_validate_range_and_filter_by_names() {
    let (workspace, _child, mut stdin, mut reader) = open_workspace("schoold-grades");

    let alice = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "fullName": "Alice", "dateOfBirth": "2010-01-01", "gender": "F" }),
    )["studentId"]
        .as_i64()
        .expect("alice");
    let math = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "classes.create",
        json!({ "name": "Math101" }),
    )["classId"]
        .as_i64()
        .expect("math");
    let art = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "classes.create",
        json!({ "name": "Art" }),
    )["classId"]
        .as_i64()
        .expect("art");
    let algebra = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "subjects.create",
        json!({ "name": "Algebra" }),
    )["subjectId"]
        .as_i64()
        .expect("algebra");

    let out_of_range = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "grades.create",
        json!({ "studentId": alice, "classId": math, "subjectId": algebra, "value": 120.0 }),
    );
    assert_eq!(out_of_range["code"], "validation_failed");

    let math_grade = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "grades.create",
        json!({ "studentId": alice, "classId": math, "subjectId": algebra, "value": 91.5 }),
    )["gradeId"]
        .as_i64()
        .expect("grade");
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "grades.create",
        json!({ "studentId": alice, "classId": art, "subjectId": algebra, "value": 40 }),
    );

    let filtered = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "grades.list",
        json!({ "className": "Math101", "subjectName": "All" }),
    );
    let rows = filtered["grades"].as_array().expect("grades");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], math_grade);
    assert_eq!(rows[0]["className"], "Math101");

    let all = request_ok(&mut stdin, &mut reader, "9", "grades.list", json!({}));
    assert_eq!(all["grades"].as_array().map(|a| a.len()), Some(2));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "grades.update",
        json!({
            "gradeId": math_grade,
            "studentId": alice,
            "classId": math,
            "subjectId": algebra,
            "value": 77.0,
        }),
    );
    let got = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "grades.get",
        json!({ "gradeId": math_grade }),
    );
    assert_eq!(got["grade"]["value"], 77.0);

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "grades.delete",
        json!({ "gradeId": math_grade }),
    );
    assert_eq!(deleted["deleted"], true);
    let records = request_ok(&mut stdin, &mut reader, "13", "grades.records", json!({}));
    assert_eq!(records["grades"].as_array().map(|a| a.len()), Some(1));

    drop(stdin);
    let _ = std::fs::remove_dir_all(workspace);
}
