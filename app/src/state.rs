//! Application state tree

use serde_json::{Map, Value};
use servir_api::ApiStateView;
use servir_core::{DateTime, Deserialize, Serialize, Utc};
use std::collections::{BTreeMap, VecDeque};

/// Language requests ask for until the user picks one
pub const DEFAULT_LANGUAGE: &str = "en";

/// Most recent pipeline events kept in [`ApiState::events`]
pub const EVENT_LOG_CAPACITY: usize = 100;

/// Root state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// UI control flags
    pub control: ControlState,
    /// Request pipeline bookkeeping
    pub api: ApiState,
    /// Notifications currently on screen
    pub notifications: NotificationState,
}

/// UI control flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    /// Whether the app is still booting; the splash screen shows while set
    pub loading: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self { loading: true }
    }
}

/// Request pipeline bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiState {
    /// Language sent as `Accept-Language`
    pub language: String,
    /// Status of every module that has issued a request
    pub modules: BTreeMap<String, ModuleStatus>,
    /// Named before/success/error events, oldest first
    pub events: VecDeque<ReceivedEvent>,
}

impl Default for ApiState {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            modules: BTreeMap::new(),
            events: VecDeque::new(),
        }
    }
}

impl ApiState {
    /// Status of `module`, if it ever issued a request
    #[must_use]
    pub fn module(&self, module: &str) -> Option<&ModuleStatus> {
        self.modules.get(module)
    }

    /// Whether `module` has a request in flight
    #[must_use]
    pub fn is_pending(&self, module: &str) -> bool {
        self.module(module).is_some_and(|status| status.pending)
    }
}

/// Loading and completion status of one module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleStatus {
    /// A request is in flight
    pub pending: bool,
    /// The last completed request failed
    pub error: bool,
    /// Body of the last completed request (error body on failure)
    pub response: Option<Value>,
}

/// A named event reported by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedEvent {
    /// Event type
    pub kind: String,
    /// Fields carried by the event
    pub fields: Map<String, Value>,
}

/// Notifications on screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationState {
    /// Id given to the next notification
    pub next_id: u64,
    /// Visible notifications, oldest first
    pub items: Vec<ShownNotification>,
}

/// A notification as displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShownNotification {
    /// Unique, increasing id
    pub id: u64,
    /// Whether it reports a failure
    pub error: bool,
    /// Text
    pub message: String,
    /// HTTP status of the call, when known
    pub status: Option<u16>,
    /// When it appeared
    pub shown_at: DateTime<Utc>,
}

impl ApiStateView for AppState {
    fn accept_language(&self) -> Option<&str> {
        Some(self.api.language.as_str()).filter(|language| !language.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = AppState::default();
        assert!(state.control.loading);
        assert_eq!(state.api.language, "en");
        assert_eq!(state.accept_language(), Some("en"));
        assert!(state.notifications.items.is_empty());
    }

    #[test]
    fn test_empty_language_sends_no_header() {
        let mut state = AppState::default();
        state.api.language.clear();
        assert_eq!(state.accept_language(), None);
    }

    #[test]
    fn test_is_pending() {
        let mut api = ApiState::default();
        assert!(!api.is_pending("users"));

        api.modules.insert(
            "users".to_string(),
            ModuleStatus {
                pending: true,
                ..ModuleStatus::default()
            },
        );
        assert!(api.is_pending("users"));
    }

    #[test]
    #[allow(clippy::unwrap_used)] // Test code can use unwrap
    fn test_state_snapshot_serializes_timestamps() {
        use servir_core::environment::Clock;

        let shown_at = servir_testing::test_clock().now();
        let mut state = AppState::default();
        state.notifications.items.push(ShownNotification {
            id: 0,
            error: true,
            message: "Table is closed".to_string(),
            status: Some(422),
            shown_at,
        });

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json["notifications"]["items"][0]["shown_at"],
            serde_json::json!("2025-01-01T00:00:00Z")
        );

        let restored: AppState = serde_json::from_value(json).unwrap();
        assert_eq!(restored, state);
    }
}
