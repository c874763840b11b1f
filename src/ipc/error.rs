use serde_json::json;
use tracing::warn;

use crate::error::RecordError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Wire form of a failed repository or report call.
pub fn record_err(id: &str, e: &RecordError) -> serde_json::Value {
    let details = match e {
        RecordError::Validation { field, .. } => Some(json!({ "field": field })),
        RecordError::Referential { entity, .. } => Some(json!({ "entity": entity.as_str() })),
        RecordError::NotFound { entity, key } => {
            Some(json!({ "entity": entity.as_str(), "key": key }))
        }
        RecordError::Ambiguous {
            entity,
            name,
            count,
        } => Some(json!({ "entity": entity.as_str(), "name": name, "count": count })),
        RecordError::Store(_) => None,
    };
    warn!(request = id, code = e.code(), error = %e, "request failed");
    err(id, e.code(), e.to_string(), details)
}
