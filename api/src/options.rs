//! Per-call options and the dispatcher capability

use crate::signal::ApiSignal;
use servir_core::environment::Emitter;
use servir_core::reducer::Reducer;
use servir_runtime::Store;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Read access to the user's current language
pub trait LanguageReader: Send + Sync {
    /// Current language tag, if one is set
    fn read_language(&self) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>>;
}

/// State that knows which language requests should ask for
pub trait ApiStateView {
    /// Value for the `Accept-Language` header
    fn accept_language(&self) -> Option<&str>;
}

impl<S, A, E, R> LanguageReader for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: ApiStateView + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn read_language(&self) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
        Box::pin(self.state(|state| state.accept_language().map(str::to_string)))
    }
}

/// A language that never changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedLanguage(pub String);

impl LanguageReader for FixedLanguage {
    fn read_language(&self) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
        let language = self.0.clone();
        Box::pin(async move { Some(language) })
    }
}

/// Where the pipeline sends its signals
#[derive(Clone)]
pub enum Dispatcher {
    /// Emit only; requests go out without `Accept-Language`
    Emit(Arc<dyn Emitter<ApiSignal>>),

    /// Emit, and localize each request with the current language
    Stateful {
        /// Signal sink
        emitter: Arc<dyn Emitter<ApiSignal>>,
        /// Language source
        language: Arc<dyn LanguageReader>,
    },
}

impl Dispatcher {
    /// Plain emitter
    #[must_use]
    pub fn emit<T>(emitter: T) -> Self
    where
        T: Emitter<ApiSignal> + 'static,
    {
        Self::Emit(Arc::new(emitter))
    }

    /// Emitter paired with a language source
    #[must_use]
    pub fn stateful<T, L>(emitter: T, language: L) -> Self
    where
        T: Emitter<ApiSignal> + 'static,
        L: LanguageReader + 'static,
    {
        Self::Stateful {
            emitter: Arc::new(emitter),
            language: Arc::new(language),
        }
    }

    /// Dispatcher that emits into `store` and reads its language
    #[must_use]
    pub fn from_store<S, A, E, R>(store: &Store<S, A, E, R>) -> Self
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: From<ApiSignal> + Send + Clone + 'static,
        S: ApiStateView + Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        Self::stateful(store.clone(), store.clone())
    }

    /// Signal sink
    #[must_use]
    pub fn emitter(&self) -> &dyn Emitter<ApiSignal> {
        match self {
            Self::Emit(emitter) | Self::Stateful { emitter, .. } => emitter.as_ref(),
        }
    }

    /// Language source, for state-aware dispatchers
    #[must_use]
    pub fn language_reader(&self) -> Option<&dyn LanguageReader> {
        match self {
            Self::Emit(_) => None,
            Self::Stateful { language, .. } => Some(language.as_ref()),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emit(_) => write!(f, "Dispatcher::Emit"),
            Self::Stateful { .. } => write!(f, "Dispatcher::Stateful"),
        }
    }
}

/// What a call should report, and where
///
/// Every option is off by default; an unset option disables its signal.
///
/// # Example
///
/// ```
/// use servir_api::RequestOptions;
///
/// let options = RequestOptions::new()
///     .with_module("users")
///     .with_success("USERS_LOADED")
///     .with_notify(true);
///
/// assert_eq!(options.module(), Some("users"));
/// assert!(options.dispatcher().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    before: Option<String>,
    success: Option<String>,
    error: Option<String>,
    module: Option<String>,
    notify: bool,
    dispatcher: Option<Dispatcher>,
}

impl RequestOptions {
    /// Options with everything disabled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit an event of this type before the call
    #[must_use]
    pub fn with_before(mut self, kind: impl Into<String>) -> Self {
        self.before = Some(kind.into());
        self
    }

    /// Emit an event of this type with the response fields on success
    #[must_use]
    pub fn with_success(mut self, kind: impl Into<String>) -> Self {
        self.success = Some(kind.into());
        self
    }

    /// Emit an event of this type with the error fields on failure
    #[must_use]
    pub fn with_error(mut self, kind: impl Into<String>) -> Self {
        self.error = Some(kind.into());
        self
    }

    /// Track loading and completion of this module
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Also notify on success
    #[must_use]
    pub const fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Send signals through this dispatcher
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Event type emitted before the call
    #[must_use]
    pub fn before(&self) -> Option<&str> {
        self.before.as_deref()
    }

    /// Event type emitted on success
    #[must_use]
    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Event type emitted on failure
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Tracked module
    #[must_use]
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Whether successes are notified
    #[must_use]
    pub const fn notify(&self) -> bool {
        self.notify
    }

    /// Signal destination
    #[must_use]
    pub const fn dispatcher(&self) -> Option<&Dispatcher> {
        self.dispatcher.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servir_testing::RecordingEmitter;

    #[tokio::test]
    async fn test_fixed_language() {
        let reader = FixedLanguage("pt-BR".to_string());
        assert_eq!(reader.read_language().await.as_deref(), Some("pt-BR"));
    }

    #[tokio::test]
    async fn test_dispatcher_routes_to_emitter() {
        let recorder = RecordingEmitter::<ApiSignal>::new();
        let dispatcher = Dispatcher::emit(recorder.clone());

        dispatcher
            .emitter()
            .emit(ApiSignal::Before {
                kind: "PING".to_string(),
            })
            .await;

        assert_eq!(recorder.len(), 1);
        assert!(dispatcher.language_reader().is_none());
        assert_eq!(format!("{dispatcher:?}"), "Dispatcher::Emit");
    }

    #[test]
    fn test_stateful_dispatcher_exposes_language() {
        let dispatcher = Dispatcher::stateful(
            RecordingEmitter::<ApiSignal>::new(),
            FixedLanguage("es".to_string()),
        );
        assert!(dispatcher.language_reader().is_some());
    }

    #[test]
    fn test_options_default_disabled() {
        let options = RequestOptions::new();
        assert_eq!(options.before(), None);
        assert_eq!(options.success(), None);
        assert_eq!(options.error(), None);
        assert_eq!(options.module(), None);
        assert!(!options.notify());
    }
}
