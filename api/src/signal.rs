//! Signals emitted by the request pipeline
//!
//! A signal is what the pipeline hands to the dispatcher. Consumers that
//! speak JSON see the flat `{"type": ..., ...}` shape from
//! [`ApiSignal::to_json`]; Rust consumers match on the enum.

use crate::outcome::Outcome;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Type of the module status signal
pub const MODULE_REQUEST: &str = "API/MODULE_REQUEST";

/// Type of the response notification signal
pub const RESPONSE_NOTIFICATION: &str = "API/RESPONSE_NOTIFICATION";

/// Notification text for successful calls whose body carries no message
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Request completed";

/// One lifecycle signal
#[derive(Debug, Clone, PartialEq)]
pub enum ApiSignal {
    /// A call is about to start
    Before {
        /// Caller-chosen event type
        kind: String,
    },

    /// Loading/completion status of a named module
    ///
    /// `error` and `response` are `None` on the start signal.
    ModuleRequest {
        /// Module name
        module: String,
        /// `Some(false)` on success, `Some(true)` on failure
        error: Option<bool>,
        /// Response body on success, error body on failure
        response: Option<Value>,
    },

    /// Caller-named success or error event carrying the body's fields
    Event {
        /// Caller-chosen event type
        kind: String,
        /// Fields merged from the body
        fields: Map<String, Value>,
    },

    /// User-facing notification about a completed call
    Notification(Notification),
}

/// Payload of a response notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Whether the call failed
    pub error: bool,
    /// Text to show
    pub message: String,
    /// HTTP status, when the API answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl Notification {
    /// Notification describing an outcome
    #[must_use]
    pub fn for_outcome(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Success(response) => Self {
                error: false,
                message: body_message(&response.body)
                    .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
                status: Some(response.status),
            },
            Outcome::Failure(error) => Self {
                error: true,
                message: error.user_message(),
                status: error.status_code(),
            },
        }
    }
}

impl ApiSignal {
    /// Signal type as seen by JSON consumers
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Before { kind } | Self::Event { kind, .. } => kind,
            Self::ModuleRequest { .. } => MODULE_REQUEST,
            Self::Notification(_) => RESPONSE_NOTIFICATION,
        }
    }

    /// Flat JSON form: `{"type": kind, ...payload}`
    ///
    /// For events the signal type wins over a `type` field in the body.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = match self {
            Self::Before { .. } => Map::new(),
            Self::ModuleRequest {
                module,
                error,
                response,
            } => {
                let mut object = Map::new();
                object.insert("module".to_string(), Value::String(module.clone()));
                if let Some(error) = error {
                    object.insert("error".to_string(), Value::Bool(*error));
                }
                if let Some(response) = response {
                    object.insert("response".to_string(), response.clone());
                }
                object
            },
            Self::Event { fields, .. } => fields.clone(),
            Self::Notification(notification) => match serde_json::to_value(notification) {
                Ok(Value::Object(object)) => object,
                _ => Map::new(),
            },
        };

        object.insert("type".to_string(), Value::String(self.kind().to_string()));
        Value::Object(object)
    }
}

impl Serialize for ApiSignal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Fields an event carries for a given body
///
/// Objects contribute their fields, other values are wrapped as `data`,
/// and `null` contributes nothing.
#[must_use]
pub fn merge_fields(body: &Value) -> Map<String, Value> {
    match body {
        Value::Object(fields) => fields.clone(),
        Value::Null => Map::new(),
        other => {
            let mut fields = Map::new();
            fields.insert("data".to_string(), other.clone());
            fields
        },
    }
}

fn body_message(body: &Value) -> Option<String> {
    body.get("message").and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::outcome::ApiResponse;
    use serde_json::json;

    #[test]
    fn test_module_request_json() {
        let start = ApiSignal::ModuleRequest {
            module: "users".to_string(),
            error: None,
            response: None,
        };
        assert_eq!(
            start.to_json(),
            json!({ "type": "API/MODULE_REQUEST", "module": "users" })
        );

        let done = ApiSignal::ModuleRequest {
            module: "users".to_string(),
            error: Some(false),
            response: Some(json!({ "id": 1 })),
        };
        assert_eq!(
            done.to_json(),
            json!({
                "type": "API/MODULE_REQUEST",
                "module": "users",
                "error": false,
                "response": { "id": 1 }
            })
        );
    }

    #[test]
    fn test_event_type_wins_over_body_type() {
        let event = ApiSignal::Event {
            kind: "USERS_LOADED".to_string(),
            fields: merge_fields(&json!({ "id": 1, "type": "admin" })),
        };
        assert_eq!(event.to_json(), json!({ "type": "USERS_LOADED", "id": 1 }));
    }

    #[test]
    fn test_merge_fields() {
        assert!(merge_fields(&Value::Null).is_empty());
        assert_eq!(
            Value::Object(merge_fields(&json!([1, 2]))),
            json!({ "data": [1, 2] })
        );
        assert_eq!(
            Value::Object(merge_fields(&json!({ "a": true }))),
            json!({ "a": true })
        );
    }

    #[test]
    fn test_notification_for_outcome() {
        let success = Outcome::Success(ApiResponse::ok(json!({ "id": 1 })));
        assert_eq!(
            Notification::for_outcome(&success),
            Notification {
                error: false,
                message: DEFAULT_SUCCESS_MESSAGE.to_string(),
                status: Some(200),
            }
        );

        let saved = Outcome::Success(ApiResponse::ok(json!({ "message": "Saved" })));
        assert_eq!(Notification::for_outcome(&saved).message, "Saved");

        let failure = Outcome::Failure(ApiError::Transport("connection refused".to_string()));
        let notification = Notification::for_outcome(&failure);
        assert!(notification.error);
        assert_eq!(notification.message, "Request failed: connection refused");
        assert_eq!(notification.status, None);
        assert_eq!(
            ApiSignal::Notification(notification).to_json(),
            json!({
                "type": "API/RESPONSE_NOTIFICATION",
                "error": true,
                "message": "Request failed: connection refused"
            })
        );
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let signal = ApiSignal::Before {
            kind: "USERS_REQUESTED".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&signal).ok(),
            Some(json!({ "type": "USERS_REQUESTED" }))
        );
    }
}
