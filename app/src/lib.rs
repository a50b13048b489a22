//! # Servir App
//!
//! Client-side application state for Servir: the loading gate shown while
//! the app boots, and the reducers that turn request pipeline signals into
//! module status, an event log and on-screen notifications.
//!
//! ## Example
//!
//! ```no_run
//! use servir_api::{ApiClient, ApiConfig, RequestOptions};
//! use servir_app::{localized_dispatcher, new_store, splash::SplashScreen, AppEnvironment};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = new_store(AppEnvironment::default());
//! let client = ApiClient::new(ApiConfig::from_env()?)?;
//!
//! let _ = client
//!     .get(
//!         "/users",
//!         RequestOptions::new()
//!             .with_module("users")
//!             .with_dispatcher(localized_dispatcher(&store)),
//!     )
//!     .await;
//!
//! println!("{}", SplashScreen::new().render_from(&store, "ready").await);
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod reducer;
pub mod splash;
pub mod state;

pub use action::AppAction;
pub use reducer::{AppEnvironment, AppReducer};
pub use state::AppState;

use servir_api::Dispatcher;
use servir_runtime::Store;

/// The application store
pub type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

/// Store with default state and the application reducer
#[must_use]
pub fn new_store(environment: AppEnvironment) -> AppStore {
    Store::new(AppState::default(), AppReducer::new(), environment)
}

/// Dispatcher that reports into `store` and sends its language with each request
#[must_use]
pub fn localized_dispatcher(store: &AppStore) -> Dispatcher {
    Dispatcher::from_store(store)
}
