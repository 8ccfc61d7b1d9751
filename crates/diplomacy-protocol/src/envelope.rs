//! The JSON response envelope and the stable error taxonomy every HTTP
//! response is funneled through (spec §7). `ErrorKind` is the only error
//! vocabulary that ever crosses the wire — module-local error enums
//! (`thiserror`, one per component) map into it at the adapter/server
//! boundary and are never exposed by name.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    NotFound,
    Conflict,
    ValidationError,
    PreconditionFailed,
    InternalError,
}

impl ErrorKind {
    /// Conventional HTTP status code for this kind (used by the server
    /// crate's `IntoResponse` impl).
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Unauthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::ValidationError => 400,
            ErrorKind::PreconditionFailed => 400,
            ErrorKind::InternalError => 500,
        }
    }
}

/// A structured API error: the stable kind, a human-readable message, and
/// optional machine-readable details (e.g. an `OrderRejection` list).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

/// The `{"ok": true, ...}` / `{"ok": false, "error": ..., "details"?: ...}`
/// envelope every endpoint replies with. `ok: true` carries the payload
/// flattened alongside it rather than nested under a `data` key, so the
/// serialization is hand-written instead of derived.
#[derive(Clone, Debug)]
pub enum ApiEnvelope<T> {
    Ok(T),
    Err { error: String, details: Option<Value> },
}

impl<T: Serialize> ApiEnvelope<T> {
    pub fn ok(value: T) -> Self {
        ApiEnvelope::Ok(value)
    }

    pub fn err(error: &ApiError) -> Self {
        ApiEnvelope::Err {
            error: error.message.clone(),
            details: error.details.clone(),
        }
    }
}

impl<T: Serialize> Serialize for ApiEnvelope<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::Error as _;

        match self {
            ApiEnvelope::Ok(value) => {
                let mut payload = serde_json::to_value(value).map_err(S::Error::custom)?;
                match payload {
                    Value::Object(ref mut map) => {
                        map.insert("ok".to_string(), Value::Bool(true));
                    }
                    other => {
                        let mut map = serde_json::Map::new();
                        map.insert("ok".to_string(), Value::Bool(true));
                        map.insert("data".to_string(), other);
                        payload = Value::Object(map);
                    }
                }
                payload.serialize(serializer)
            }
            ApiEnvelope::Err { error, details } => {
                let mut map = serde_json::Map::new();
                map.insert("ok".to_string(), Value::Bool(false));
                map.insert("error".to_string(), Value::String(error.clone()));
                if let Some(details) = details {
                    map.insert("details".to_string(), details.clone());
                }
                Value::Object(map).serialize(serializer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_conventional_statuses() {
        assert_eq!(ErrorKind::Unauthenticated.http_status(), 401);
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::ValidationError.http_status(), 400);
        assert_eq!(ErrorKind::PreconditionFailed.http_status(), 400);
    }

    #[test]
    fn envelope_ok_serializes_with_ok_true_and_flattened_payload() {
        let env = ApiEnvelope::ok(serde_json::json!({"id": 1}));
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["ok"], true);
        assert_eq!(v["id"], 1);
    }

    #[test]
    fn envelope_err_carries_message_and_details() {
        let err = ApiError::new(ErrorKind::ValidationError, "bad order")
            .with_details(serde_json::json!({"suggestions": []}));
        let env: ApiEnvelope<()> = ApiEnvelope::err(&err);
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["ok"], false);
        assert_eq!(v["error"], "bad order");
        assert!(v.get("details").is_some());
    }
}
