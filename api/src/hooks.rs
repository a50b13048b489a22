//! Outcome hooks
//!
//! The side effects of a call are an ordered list of hooks built from the
//! request options. Each hook looks at the outcome and contributes at most
//! one signal; the pipeline emits them in list order.

use crate::error::ApiError;
use crate::options::RequestOptions;
use crate::outcome::Outcome;
use crate::signal::{merge_fields, ApiSignal, Notification};
use serde_json::{Map, Value};

/// Maps an outcome to an optional signal
pub trait OutcomeHook: Send + Sync {
    /// Signal to emit for this outcome, if any
    fn on_outcome(&self, outcome: &Outcome) -> Option<ApiSignal>;
}

/// Reports completion of a named module
#[derive(Debug, Clone)]
pub struct ModuleStatusHook {
    module: String,
}

impl ModuleStatusHook {
    /// Hook for `module`
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }

    /// Signal marking the module as loading
    #[must_use]
    pub fn start_signal(&self) -> ApiSignal {
        ApiSignal::ModuleRequest {
            module: self.module.clone(),
            error: None,
            response: None,
        }
    }
}

impl OutcomeHook for ModuleStatusHook {
    fn on_outcome(&self, outcome: &Outcome) -> Option<ApiSignal> {
        let (error, response) = match outcome {
            Outcome::Success(response) => (false, Some(response.body.clone())),
            Outcome::Failure(error) => (true, error.body().cloned()),
        };

        Some(ApiSignal::ModuleRequest {
            module: self.module.clone(),
            error: Some(error),
            response,
        })
    }
}

/// Emits a named event with the response body's fields on success
#[derive(Debug, Clone)]
pub struct SuccessEventHook {
    kind: String,
}

impl SuccessEventHook {
    /// Hook emitting events of type `kind`
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl OutcomeHook for SuccessEventHook {
    fn on_outcome(&self, outcome: &Outcome) -> Option<ApiSignal> {
        let response = outcome.response()?;
        Some(ApiSignal::Event {
            kind: self.kind.clone(),
            fields: merge_fields(&response.body),
        })
    }
}

/// Emits a named event with the error body's fields on failure
#[derive(Debug, Clone)]
pub struct ErrorEventHook {
    kind: String,
}

impl ErrorEventHook {
    /// Hook emitting events of type `kind`
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl OutcomeHook for ErrorEventHook {
    fn on_outcome(&self, outcome: &Outcome) -> Option<ApiSignal> {
        let error = outcome.error()?;
        Some(ApiSignal::Event {
            kind: self.kind.clone(),
            fields: error_fields(error),
        })
    }
}

/// Emits a notification on every failure, and on success when asked to
#[derive(Debug, Clone, Copy)]
pub struct NotificationHook {
    on_success: bool,
}

impl NotificationHook {
    /// Hook that also notifies successful calls when `on_success` is set
    #[must_use]
    pub const fn new(on_success: bool) -> Self {
        Self { on_success }
    }
}

impl OutcomeHook for NotificationHook {
    fn on_outcome(&self, outcome: &Outcome) -> Option<ApiSignal> {
        if outcome.is_success() && !self.on_success {
            return None;
        }
        Some(ApiSignal::Notification(Notification::for_outcome(outcome)))
    }
}

fn error_fields(error: &ApiError) -> Map<String, Value> {
    match error.body() {
        Some(body) => merge_fields(body),
        None => {
            let mut fields = Map::new();
            fields.insert("message".to_string(), Value::String(error.user_message()));
            fields
        },
    }
}

/// Signals for one call, derived from its options
///
/// Completion order is module status, then the success or error event, then
/// the notification.
pub struct Pipeline {
    before: Option<String>,
    module: Option<ModuleStatusHook>,
    hooks: Vec<Box<dyn OutcomeHook>>,
}

impl Pipeline {
    /// Build the hook list for `options`
    #[must_use]
    pub fn from_options(options: &RequestOptions) -> Self {
        let module = options.module().map(ModuleStatusHook::new);

        let mut hooks: Vec<Box<dyn OutcomeHook>> = Vec::with_capacity(4);
        if let Some(module) = &module {
            hooks.push(Box::new(module.clone()));
        }
        if let Some(kind) = options.success() {
            hooks.push(Box::new(SuccessEventHook::new(kind)));
        }
        if let Some(kind) = options.error() {
            hooks.push(Box::new(ErrorEventHook::new(kind)));
        }
        hooks.push(Box::new(NotificationHook::new(options.notify())));

        Self {
            before: options.before().map(str::to_string),
            module,
            hooks,
        }
    }

    /// Signals emitted before the HTTP call
    #[must_use]
    pub fn start_signals(&self) -> Vec<ApiSignal> {
        let before = self
            .before
            .as_ref()
            .map(|kind| ApiSignal::Before { kind: kind.clone() });
        let module = self.module.as_ref().map(ModuleStatusHook::start_signal);

        before.into_iter().chain(module).collect()
    }

    /// Signals emitted once the call has settled
    #[must_use]
    pub fn completion_signals(&self, outcome: &Outcome) -> Vec<ApiSignal> {
        self.hooks
            .iter()
            .filter_map(|hook| hook.on_outcome(outcome))
            .collect()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("before", &self.before)
            .field("module", &self.module)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
