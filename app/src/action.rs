//! Application actions

use servir_api::ApiSignal;

/// Every input the application reducer handles
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Show or hide the splash screen
    SetLoading(bool),
    /// Change the language requests ask for
    SetLanguage(String),
    /// A request pipeline signal
    Api(ApiSignal),
    /// Remove a notification from screen
    DismissNotification {
        /// Notification id
        id: u64,
    },
}

impl From<ApiSignal> for AppAction {
    fn from(signal: ApiSignal) -> Self {
        Self::Api(signal)
    }
}
