//! Application reducers
//!
//! [`AppReducer`] combines one reducer per state slice. Each slice reducer
//! sees every action and ignores the ones it doesn't own.

use crate::action::AppAction;
use crate::state::{
    ApiState, AppState, ControlState, ModuleStatus, NotificationState, ReceivedEvent,
    ShownNotification, EVENT_LOG_CAPACITY,
};
use serde_json::{Map, Value};
use servir_api::ApiSignal;
use servir_core::composition::{combine_reducers, scope_reducer, CombinedReducer};
use servir_core::effect::Effect;
use servir_core::environment::{Clock, SystemClock};
use servir_core::reducer::Reducer;
use servir_core::{delay, smallvec, SmallVec};
use std::sync::Arc;
use std::time::Duration;

/// How long a notification stays on screen by default
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Dependencies injected into the reducers
#[derive(Clone)]
pub struct AppEnvironment {
    /// Time source for notification timestamps
    pub clock: Arc<dyn Clock>,
    /// Delay before a notification is dismissed; zero keeps it until dismissed
    pub notification_ttl: Duration,
}

impl AppEnvironment {
    /// Environment with the default notification lifetime
    #[must_use]
    pub fn new<C: Clock + 'static>(clock: C) -> Self {
        Self {
            clock: Arc::new(clock),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }

    /// Override the notification lifetime
    #[must_use]
    pub const fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = ttl;
        self
    }
}

impl Default for AppEnvironment {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl std::fmt::Debug for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppEnvironment")
            .field("notification_ttl", &self.notification_ttl)
            .finish_non_exhaustive()
    }
}

/// Owns `control`
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlReducer;

impl Reducer for ControlReducer {
    type State = ControlState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if let AppAction::SetLoading(loading) = action {
            state.loading = loading;
        }
        smallvec![Effect::None]
    }
}

/// Owns `api`: language, module status and the event log
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiReducer;

impl ApiReducer {
    fn record(state: &mut ApiState, kind: String, fields: Map<String, Value>) {
        if state.events.len() == EVENT_LOG_CAPACITY {
            state.events.pop_front();
        }
        state.events.push_back(ReceivedEvent { kind, fields });
    }
}

impl Reducer for ApiReducer {
    type State = ApiState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::SetLanguage(language) => {
                state.language = language;
            },
            AppAction::Api(ApiSignal::ModuleRequest {
                module,
                error: None,
                ..
            }) => {
                // The previous response stays visible while reloading.
                let status = state.modules.entry(module).or_default();
                status.pending = true;
                status.error = false;
            },
            AppAction::Api(ApiSignal::ModuleRequest {
                module,
                error: Some(error),
                response,
            }) => {
                state.modules.insert(
                    module,
                    ModuleStatus {
                        pending: false,
                        error,
                        response,
                    },
                );
            },
            AppAction::Api(ApiSignal::Before { kind }) => {
                Self::record(state, kind, Map::new());
            },
            AppAction::Api(ApiSignal::Event { kind, fields }) => {
                Self::record(state, kind, fields);
            },
            AppAction::SetLoading(_)
            | AppAction::Api(ApiSignal::Notification(_))
            | AppAction::DismissNotification { .. } => {},
        }
        smallvec![Effect::None]
    }
}

/// Owns `notifications`
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationReducer;

impl Reducer for NotificationReducer {
    type State = NotificationState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::Api(ApiSignal::Notification(notification)) => {
                let id = state.next_id;
                state.next_id += 1;
                state.items.push(ShownNotification {
                    id,
                    error: notification.error,
                    message: notification.message,
                    status: notification.status,
                    shown_at: env.clock.now(),
                });

                if env.notification_ttl.is_zero() {
                    smallvec![Effect::None]
                } else {
                    smallvec![delay! {
                        duration: env.notification_ttl,
                        action: AppAction::DismissNotification { id }
                    }]
                }
            },
            AppAction::DismissNotification { id } => {
                state.items.retain(|item| item.id != id);
                smallvec![Effect::None]
            },
            _ => smallvec![Effect::None],
        }
    }
}

/// Root reducer
pub struct AppReducer {
    inner: CombinedReducer<AppState, AppAction, AppEnvironment>,
}

impl AppReducer {
    /// Combine the slice reducers
    #[must_use]
    pub fn new() -> Self {
        let inner = combine_reducers(vec![
            Box::new(scope_reducer(
                ControlReducer,
                |state: &AppState| &state.control,
                |state: &mut AppState, control| state.control = control,
            )),
            Box::new(scope_reducer(
                ApiReducer,
                |state: &AppState| &state.api,
                |state: &mut AppState, api| state.api = api,
            )),
            Box::new(scope_reducer(
                NotificationReducer,
                |state: &AppState| &state.notifications,
                |state: &mut AppState, notifications| state.notifications = notifications,
            )),
        ]);

        Self { inner }
    }
}

impl Default for AppReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        self.inner.reduce(state, action, env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use servir_api::Notification;
    use servir_testing::{assertions, test_clock, ReducerTest};

    fn env() -> AppEnvironment {
        AppEnvironment::new(test_clock())
    }

    fn module_start(module: &str) -> AppAction {
        AppAction::Api(ApiSignal::ModuleRequest {
            module: module.to_string(),
            error: None,
            response: None,
        })
    }

    #[test]
    fn test_set_loading() {
        ReducerTest::new(AppReducer::new())
            .with_env(env())
            .given_state(AppState::default())
            .when_action(AppAction::SetLoading(false))
            .then_state(|state| {
                assert!(!state.control.loading);
            })
            .then_effects(|effects| {
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn test_module_lifecycle() {
        ReducerTest::new(AppReducer::new())
            .with_env(env())
            .given_state(AppState::default())
            .when_action(module_start("users"))
            .then_state(|state| {
                assert!(state.api.is_pending("users"));
            })
            .run();

        ReducerTest::new(AppReducer::new())
            .with_env(env())
            .given_state(AppState::default())
            .when_action(module_start("users"))
            .when_action(AppAction::Api(ApiSignal::ModuleRequest {
                module: "users".to_string(),
                error: Some(false),
                response: Some(json!({ "id": 1 })),
            }))
            .then_state(|state| {
                assert_eq!(
                    state.api.module("users"),
                    Some(&ModuleStatus {
                        pending: false,
                        error: false,
                        response: Some(json!({ "id": 1 })),
                    })
                );
            })
            .run();
    }

    #[test]
    fn test_reload_keeps_previous_response() {
        let mut state = AppState::default();
        state.api.modules.insert(
            "users".to_string(),
            ModuleStatus {
                pending: false,
                error: true,
                response: Some(json!({ "message": "boom" })),
            },
        );

        ReducerTest::new(AppReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(module_start("users"))
            .then_state(|state| {
                let status = state.api.module("users");
                assert_eq!(status.map(|s| (s.pending, s.error)), Some((true, false)));
                assert_eq!(
                    status.and_then(|s| s.response.clone()),
                    Some(json!({ "message": "boom" }))
                );
            })
            .run();
    }

    #[test]
    fn test_events_are_logged_in_order() {
        ReducerTest::new(AppReducer::new())
            .with_env(env())
            .given_state(AppState::default())
            .when_action(AppAction::Api(ApiSignal::Before {
                kind: "USERS_REQUESTED".to_string(),
            }))
            .when_action(AppAction::Api(ApiSignal::Event {
                kind: "USERS_LOADED".to_string(),
                fields: servir_api::signal::merge_fields(&json!({ "id": 1 })),
            }))
            .then_state(|state| {
                let kinds: Vec<&str> = state.api.events.iter().map(|e| e.kind.as_str()).collect();
                assert_eq!(kinds, vec!["USERS_REQUESTED", "USERS_LOADED"]);
                assert_eq!(state.api.events[1].fields.get("id"), Some(&json!(1)));
            })
            .run();
    }

    #[test]
    fn test_event_log_is_bounded() {
        let mut state = AppState::default();
        let reducer = AppReducer::new();
        let env = env();

        for n in 0..=EVENT_LOG_CAPACITY {
            let _ = reducer.reduce(
                &mut state,
                AppAction::Api(ApiSignal::Before {
                    kind: format!("E{n}"),
                }),
                &env,
            );
        }

        assert_eq!(state.api.events.len(), EVENT_LOG_CAPACITY);
        assert_eq!(state.api.events.front().map(|e| e.kind.as_str()), Some("E1"));
    }

    #[test]
    fn test_notification_is_shown_and_scheduled_for_dismissal() {
        ReducerTest::new(AppReducer::new())
            .with_env(env())
            .given_state(AppState::default())
            .when_action(AppAction::Api(ApiSignal::Notification(Notification {
                error: true,
                message: "Request failed: connection refused".to_string(),
                status: None,
            })))
            .then_state(|state| {
                assert_eq!(state.notifications.items.len(), 1);
                assert_eq!(state.notifications.items[0].id, 0);
                assert_eq!(state.notifications.items[0].shown_at, test_clock().now());
                assert_eq!(state.notifications.next_id, 1);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_delayed_action(effects, |action| {
                    *action == AppAction::DismissNotification { id: 0 }
                });
            })
            .run();
    }

    #[test]
    fn test_zero_ttl_keeps_notification() {
        ReducerTest::new(AppReducer::new())
            .with_env(env().with_notification_ttl(Duration::ZERO))
            .given_state(AppState::default())
            .when_action(AppAction::Api(ApiSignal::Notification(Notification {
                error: false,
                message: "Saved".to_string(),
                status: Some(200),
            })))
            .then_effects(|effects| {
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn test_dismiss_notification() {
        let mut state = AppState::default();
        state.notifications = NotificationState {
            next_id: 2,
            items: vec![
                ShownNotification {
                    id: 0,
                    error: false,
                    message: "a".to_string(),
                    status: None,
                    shown_at: test_clock().now(),
                },
                ShownNotification {
                    id: 1,
                    error: true,
                    message: "b".to_string(),
                    status: Some(500),
                    shown_at: test_clock().now(),
                },
            ],
        };

        ReducerTest::new(AppReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(AppAction::DismissNotification { id: 0 })
            .then_state(|state| {
                let ids: Vec<u64> = state.notifications.items.iter().map(|n| n.id).collect();
                assert_eq!(ids, vec![1]);
            })
            .run();
    }

    #[test]
    fn test_set_language() {
        ReducerTest::new(AppReducer::new())
            .with_env(env())
            .given_state(AppState::default())
            .when_action(AppAction::SetLanguage("pt-BR".to_string()))
            .then_state(|state| {
                assert_eq!(state.api.language, "pt-BR");
            })
            .run();
    }
}
