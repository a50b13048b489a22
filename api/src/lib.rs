//! # Servir API
//!
//! HTTP request pipeline for the Servir client.
//!
//! Every call goes through [`ApiClient`] and reports its lifecycle through
//! the [`Dispatcher`] in its [`RequestOptions`]:
//!
//! 1. an optional `before` event,
//! 2. a module start signal when a module is tracked,
//! 3. the HTTP call,
//! 4. module completion, the success or error event, and a notification.
//!
//! Calls never fail from the caller's side; they resolve to an [`Outcome`].
//! When the dispatcher is state-aware (for example built with
//! [`Dispatcher::from_store`]) the request also carries the user's language
//! in `Accept-Language`.
//!
//! ## Example
//!
//! ```
//! use servir_api::{
//!     ApiClient, ApiConfig, ApiResponse, ApiSignal, BuildEnvironment, Dispatcher,
//!     MockTransport, RequestOptions,
//! };
//! use servir_testing::RecordingEmitter;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let transport = MockTransport::new()
//!     .with_response("GET /users", Ok(ApiResponse::ok(json!({ "id": 1 }))));
//! let client = ApiClient::with_transport(
//!     ApiConfig::for_environment(BuildEnvironment::Development),
//!     transport,
//! );
//!
//! let signals = RecordingEmitter::<ApiSignal>::new();
//! let outcome = client
//!     .get(
//!         "/users",
//!         RequestOptions::new()
//!             .with_module("users")
//!             .with_success("USERS_LOADED")
//!             .with_dispatcher(Dispatcher::emit(signals.clone())),
//!     )
//!     .await;
//!
//! assert!(outcome.is_success());
//! assert_eq!(signals.len(), 3);
//! # });
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod hooks;
pub mod options;
pub mod outcome;
pub mod request;
pub mod signal;
pub mod transport;

pub use client::ApiClient;
pub use config::{ApiConfig, BuildEnvironment, ConfigError};
pub use error::ApiError;
pub use hooks::{OutcomeHook, Pipeline};
pub use options::{ApiStateView, Dispatcher, FixedLanguage, LanguageReader, RequestOptions};
pub use outcome::{ApiResponse, Outcome};
pub use request::{Method, RequestDescriptor, ACCEPT_LANGUAGE};
pub use signal::{ApiSignal, Notification, MODULE_REQUEST, RESPONSE_NOTIFICATION};
pub use transport::{HttpTransport, MockTransport, PreparedRequest, ReqwestTransport};
