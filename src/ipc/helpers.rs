use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{RecordError, RecordResult};
use crate::ipc::error::{err, ok, record_err};
use crate::ipc::types::{AppState, Request};
use crate::model::{optional_text, parse_date, Entity, Gender, StudentInput};
use crate::query::filter_value;
use crate::store::SqliteStore;

/// A handler's outcome: the `result` payload, or an already-built error response.
pub type Reply = Result<serde_json::Value, serde_json::Value>;

pub fn finish(req: &Request, reply: Reply) -> serde_json::Value {
    match reply {
        Ok(result) => ok(&req.id, result),
        Err(resp) => resp,
    }
}

pub fn store<'a>(state: &'a AppState, req: &Request) -> Result<&'a SqliteStore, serde_json::Value> {
    state
        .store
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

/// Lifts a repository result into a reply, mapping the error to its wire code.
pub fn record<T>(req: &Request, result: RecordResult<T>) -> Result<T, serde_json::Value> {
    result.map_err(|e| record_err(&req.id, &e))
}

/// Turns an absent row into a `not_found` reply.
pub fn found<T>(
    req: &Request,
    entity: Entity,
    id: i64,
    row: Option<T>,
) -> Result<T, serde_json::Value> {
    row.ok_or_else(|| record_err(&req.id, &RecordError::not_found(entity, id)))
}

pub fn required_i64(req: &Request, key: &str) -> Result<i64, serde_json::Value> {
    match optional_i64(req, key)? {
        Some(v) => Ok(v),
        None => Err(err(&req.id, "bad_params", format!("missing {key}"), None)),
    }
}

pub fn optional_i64(req: &Request, key: &str) -> Result<Option<i64>, serde_json::Value> {
    match req.params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{key} must be an integer"),
                None,
            )
        }),
    }
}

pub fn required_str<'r>(req: &'r Request, key: &str) -> Result<&'r str, serde_json::Value> {
    optional_str(req, key)
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {key}"), None))
}

pub fn optional_str<'r>(req: &'r Request, key: &str) -> Option<&'r str> {
    req.params.get(key).and_then(|v| v.as_str())
}

/// Reads an optional name filter; the "all" sentinels and blank input mean no filter.
pub fn name_filter<'r>(req: &'r Request, key: &str, sentinels: &[&str]) -> Option<&'r str> {
    filter_value(optional_str(req, key), sentinels)
}

/// Reads `<idKey>`, or resolves `<nameKey>` through `by_name` when no id is given.
pub fn id_or_name(
    req: &Request,
    id_key: &str,
    name_key: &str,
    by_name: impl FnOnce(&str) -> RecordResult<i64>,
) -> Result<i64, serde_json::Value> {
    if let Some(id) = optional_i64(req, id_key)? {
        return Ok(id);
    }
    match optional_str(req, name_key) {
        Some(name) => record(req, by_name(name)),
        None => Err(err(
            &req.id,
            "bad_params",
            format!("missing {id_key} or {name_key}"),
            None,
        )),
    }
}

pub fn parse_params<T: DeserializeOwned>(req: &Request) -> Result<T, serde_json::Value> {
    serde_json::from_value(req.params.clone())
        .map_err(|e| err(&req.id, "bad_params", e.to_string(), None))
}

/// Student fields as they arrive on the wire. Date and gender stay strings so a
/// malformed value is reported as a validation failure rather than bad JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentParams {
    pub full_name: String,
    pub date_of_birth: String,
    pub gender: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl StudentParams {
    pub fn into_input(self) -> RecordResult<StudentInput> {
        Ok(StudentInput {
            full_name: self.full_name,
            date_of_birth: parse_date("dateOfBirth", &self.date_of_birth)?,
            gender: Gender::parse(&self.gender)?,
            email: optional_text(self.email.as_deref()),
            phone: optional_text(self.phone.as_deref()),
            address: optional_text(self.address.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn req(params: serde_json::Value) -> Request {
        Request {
            id: "t".into(),
            method: "test".into(),
            params,
        }
    }

    #[test]
    fn integer_params_reject_strings() {
        let r = req(json!({ "classId": "7" }));
        let e = required_i64(&r, "classId").expect_err("string id");
        assert_eq!(e["error"]["code"], "bad_params");
        assert_eq!(optional_i64(&req(json!({})), "classId").expect("absent"), None);
    }

    #[test]
    fn sentinel_names_are_no_filter() {
        let r = req(json!({ "className": "All Classes" }));
        assert_eq!(name_filter(&r, "className", &["All Classes", "All"]), None);
        let r = req(json!({ "className": "Math101" }));
        assert_eq!(
            name_filter(&r, "className", &["All Classes", "All"]),
            Some("Math101")
        );
    }

    #[test]
    fn bad_student_date_is_a_validation_error() {
        let params = StudentParams {
            full_name: "Alice".into(),
            date_of_birth: "2010-13-40".into(),
            gender: "F".into(),
            email: None,
            phone: None,
            address: None,
        };
        let e = params.into_input().expect_err("bad date");
        assert_eq!(e.code(), "validation_failed");
    }
}
