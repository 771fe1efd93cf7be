//! JSON-RPC 2.0 types and message handling
//!
//! The binary speaks line-delimited JSON-RPC 2.0 over stdio; method names
//! are the command names of the registry.

pub mod router;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::PromptPortError;

/// Invalid JSON was received
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid request object
pub const INVALID_REQUEST: i32 = -32600;

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub id: Id,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

/// JSON-RPC 2.0 Notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC 2.0 Error Object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC 2.0 ID (String, Number, or null when the request id is unknown)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Id {
    String(String),
    Number(i64),
    Null,
}

impl Response {
    pub fn success(id: Id, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Id, error: ErrorObject) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Response for a line that could not be parsed at all
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::error(
            Id::Null,
            ErrorObject {
                code:    PARSE_ERROR,
                message: message.into(),
                data:    None,
            },
        )
    }
}

impl From<&PromptPortError> for ErrorObject {
    fn from(err: &PromptPortError) -> Self {
        ErrorObject {
            code:    err.to_jsonrpc_code(),
            message: err.user_message(),
            data:    Some(serde_json::json!({
                "category": err.category(),
                "detail": err.to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_id_forms() {
        let number: Id = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(number, Id::Number(7));
        let string: Id = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(string, Id::String("abc".into()));
        let null: Id = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(null, Id::Null);
        assert_eq!(serde_json::to_value(Id::Null).unwrap(), json!(null));
    }

    #[test]
    fn test_success_response_omits_error() {
        let value = serde_json::to_value(Response::success(Id::Number(1), json!({"ok": true}))).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["result"]["ok"], json!(true));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_parse_error_response() {
        let value = serde_json::to_value(Response::parse_error("bad")).unwrap();
        assert_eq!(value["id"], json!(null));
        assert_eq!(value["error"]["code"], json!(PARSE_ERROR));
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_error_object_from_error() {
        let err = PromptPortError::IndexOutOfBounds { index: 3, len: 1 };
        let object = ErrorObject::from(&err);
        assert_eq!(object.code, -32602);
        assert_eq!(object.message, err.user_message());
        assert_eq!(object.data.unwrap()["category"], json!(err.category()));
    }
}
