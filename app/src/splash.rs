//! Loading gate
//!
//! While `control.loading` is set the app shows a splash message instead of
//! its content. The gate itself is a pure function of the flag; the content
//! passes through untouched once loading is over.

use crate::state::AppState;
use servir_core::reducer::Reducer;
use servir_runtime::Store;
use std::borrow::Cow;
use std::fmt;

/// Message shown while the app is loading
pub const LOADING_MESSAGE: &str = "Servir.me is loading";

/// What the gate renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate<C> {
    /// The splash message
    Loading(Cow<'static, str>),
    /// The wrapped content, unchanged
    Ready(C),
}

impl<C> Gate<C> {
    /// Whether the splash message is showing
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    /// Wrapped content, once ready
    #[must_use]
    pub const fn ready(&self) -> Option<&C> {
        match self {
            Self::Loading(_) => None,
            Self::Ready(children) => Some(children),
        }
    }

    /// Take the wrapped content, once ready
    #[must_use]
    pub fn into_ready(self) -> Option<C> {
        match self {
            Self::Loading(_) => None,
            Self::Ready(children) => Some(children),
        }
    }
}

impl<C: fmt::Display> fmt::Display for Gate<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading(message) => f.write_str(message),
            Self::Ready(children) => children.fmt(f),
        }
    }
}

/// Gate `children` behind the loading flag with the default message
#[must_use]
pub fn loading_gate<C>(is_loading: bool, children: C) -> Gate<C> {
    SplashScreen::new().render(is_loading, children)
}

/// Selector for the loading flag
#[must_use]
pub const fn is_loading(state: &AppState) -> bool {
    state.control.loading
}

/// Splash screen bound to the application state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplashScreen {
    message: Cow<'static, str>,
}

impl SplashScreen {
    /// Splash screen with the default message
    #[must_use]
    pub const fn new() -> Self {
        Self {
            message: Cow::Borrowed(LOADING_MESSAGE),
        }
    }

    /// Splash screen with a custom message
    #[must_use]
    pub fn with_message(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Message shown while loading
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gate `children` behind `is_loading`
    #[must_use]
    pub fn render<C>(&self, is_loading: bool, children: C) -> Gate<C> {
        if is_loading {
            Gate::Loading(self.message.clone())
        } else {
            Gate::Ready(children)
        }
    }

    /// Gate `children` behind the loading flag of a running store
    #[must_use]
    pub async fn render_from<A, E, R, C>(
        &self,
        store: &Store<AppState, A, E, R>,
        children: C,
    ) -> Gate<C>
    where
        R: Reducer<State = AppState, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        E: Send + Sync + 'static,
    {
        let loading = store.state(is_loading).await;
        self.render(loading, children)
    }
}

impl Default for SplashScreen {
    fn default() -> Self {
        Self::new()
    }
}
