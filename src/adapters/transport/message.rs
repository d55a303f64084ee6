//! Wire messages of the microservice transport (NestJS TCP compatible).

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Correlation id of a request. Peers send strings or numbers and the reply
/// carries the id back in the form it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Text(String),
    Number(Number),
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self::Number(id.into())
    }
}

/// Request or event. Requests carry an `id` and expect exactly one reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub pattern: Value,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
}

impl IncomingMessage {
    pub fn request(cmd: &str, data: Value, id: impl Into<MessageId>) -> Self {
        Self {
            pattern: serde_json::json!({ "cmd": cmd }),
            data,
            id: Some(id.into()),
        }
    }

    /// Routing command of the pattern.
    ///
    /// Accepts `{"cmd": "x"}`, the same object encoded as a JSON string, or a plain `"x"`.
    pub fn command(&self) -> Result<String, DomainError> {
        match &self.pattern {
            Value::Object(map) => map
                .get("cmd")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| DomainError::UnknownPattern(self.pattern.to_string())),
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map
                    .get("cmd")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .ok_or_else(|| DomainError::UnknownPattern(raw.clone())),
                _ => Ok(raw.clone()),
            },
            other => Err(DomainError::UnknownPattern(other.to_string())),
        }
    }
}

/// Error body of a failed reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    pub status: String,
    pub code: String,
    pub message: String,
}

impl From<&DomainError> for WireError {
    fn from(err: &DomainError) -> Self {
        Self {
            status: "error".into(),
            code: err.code().into(),
            message: err.to_string(),
        }
    }
}

impl From<WireError> for DomainError {
    fn from(err: WireError) -> Self {
        DomainError::remote(&err.code, err.message)
    }
}

/// Reply to a request. Exactly one of `response` / `err` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingResponse {
    pub id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<WireError>,
    #[serde(rename = "isDisposed", default)]
    pub is_disposed: bool,
}

impl OutgoingResponse {
    pub fn reply(id: MessageId, result: &Result<Value, DomainError>) -> Self {
        let (response, err) = match result {
            Ok(value) => (Some(value.clone()), None),
            Err(e) => (None, Some(WireError::from(e))),
        };
        Self {
            id,
            response,
            err,
            is_disposed: true,
        }
    }

    /// The reply as a result. A reply with neither field set yields `null`.
    pub fn into_result(self) -> Result<Value, DomainError> {
        match self.err {
            Some(err) => Err(err.into()),
            None => Ok(self.response.unwrap_or(Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_pattern(pattern: Value) -> IncomingMessage {
        IncomingMessage {
            pattern,
            data: Value::Null,
            id: None,
        }
    }

    #[test]
    fn pattern_forms() {
        assert_eq!(
            with_pattern(json!({"cmd": "get_client"})).command().unwrap(),
            "get_client"
        );
        assert_eq!(
            with_pattern(json!("{\"cmd\":\"get_all_tags\"}")).command().unwrap(),
            "get_all_tags"
        );
        assert_eq!(with_pattern(json!("ping")).command().unwrap(), "ping");
        assert!(with_pattern(json!({"role": "x"})).command().is_err());
        assert!(with_pattern(json!(7)).command().is_err());
    }

    #[test]
    fn request_without_id_is_an_event() {
        let msg: IncomingMessage =
            serde_json::from_value(json!({"pattern": "client_seen", "data": 4})).unwrap();
        assert!(msg.id.is_none());
        assert_eq!(msg.data, json!(4));
    }

    #[test]
    fn error_reply_shape() {
        let reply = OutgoingResponse::reply(
            MessageId::from("abc"),
            &Err(DomainError::not_found("project", 2)),
        );
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "abc",
                "err": {"status": "error", "code": "NOT_FOUND", "message": "project 2 not found"},
                "isDisposed": true
            })
        );

        let err = reply.into_result().unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "project 2 not found");
    }

    #[test]
    fn success_reply_shape() {
        let reply = OutgoingResponse::reply(MessageId::from("1"), &Ok(json!("pong")));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"id": "1", "response": "pong", "isDisposed": true})
        );
        assert_eq!(reply.into_result().unwrap(), json!("pong"));
    }

    #[test]
    fn numeric_ids_keep_their_form() {
        let msg: IncomingMessage =
            serde_json::from_value(json!({"pattern": "ping", "id": 17})).unwrap();
        assert_eq!(msg.id, Some(MessageId::from(17)));

        let reply = OutgoingResponse::reply(MessageId::from(17), &Ok(Value::Null));
        assert_eq!(serde_json::to_value(&reply).unwrap()["id"], json!(17));
        assert_eq!(MessageId::from(17).to_string(), "17");

        let msg: IncomingMessage =
            serde_json::from_value(json!({"pattern": "ping", "id": null})).unwrap();
        assert!(msg.id.is_none());
    }
}
