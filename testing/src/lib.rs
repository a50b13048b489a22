//! # Servir Testing
//!
//! Testing utilities and helpers for the Servir client architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (`FixedClock`, `RecordingEmitter`)
//! - A fluent Given-When-Then harness for reducers (`ReducerTest`)
//! - Test logging setup
//!
//! ## Example
//!
//! ```ignore
//! use servir_testing::{test_clock, RecordingEmitter};
//!
//! #[tokio::test]
//! async fn test_users_request() {
//!     let emitter = RecordingEmitter::new();
//!     let options = RequestOptions::new()
//!         .with_module("users")
//!         .with_dispatcher(Dispatcher::emit(emitter.clone()));
//!
//!     api.get("/users", options).await;
//!
//!     assert_eq!(emitter.len(), 2);
//! }
//! ```

use chrono::{DateTime, Utc};
use servir_core::environment::{Clock, Emitter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Arc, Clock, DateTime, Emitter, Future, Mutex, Pin, PoisonError, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use servir_testing::mocks::FixedClock;
    /// use servir_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }

    /// Emitter that records every signal it receives, in order
    ///
    /// Clones share the same log, so a test can hand one clone to the code
    /// under test and inspect another.
    ///
    /// # Example
    ///
    /// ```
    /// use servir_core::environment::Emitter;
    /// use servir_testing::RecordingEmitter;
    ///
    /// # tokio_test::block_on(async {
    /// let emitter = RecordingEmitter::new();
    /// emitter.emit("started").await;
    /// emitter.emit("finished").await;
    /// assert_eq!(emitter.signals(), vec!["started", "finished"]);
    /// # });
    /// ```
    #[derive(Debug)]
    pub struct RecordingEmitter<S> {
        signals: Arc<Mutex<Vec<S>>>,
    }

    impl<S> RecordingEmitter<S> {
        /// Create an emitter with an empty log
        #[must_use]
        pub fn new() -> Self {
            Self {
                signals: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Number of signals recorded so far
        #[must_use]
        pub fn len(&self) -> usize {
            self.signals
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Whether nothing has been emitted
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Drain the log
        #[must_use]
        pub fn take(&self) -> Vec<S> {
            std::mem::take(
                &mut *self
                    .signals
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            )
        }
    }

    impl<S: Clone> RecordingEmitter<S> {
        /// Snapshot of every signal recorded so far
        #[must_use]
        pub fn signals(&self) -> Vec<S> {
            self.signals
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl<S> Default for RecordingEmitter<S> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<S> Clone for RecordingEmitter<S> {
        fn clone(&self) -> Self {
            Self {
                signals: Arc::clone(&self.signals),
            }
        }
    }

    impl<S: Send> Emitter<S> for RecordingEmitter<S> {
        fn emit(&self, signal: S) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            self.signals
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(signal);
            Box::pin(std::future::ready(()))
        }
    }
}

/// Install a test-friendly tracing subscriber (idempotent)
///
/// Honors `RUST_LOG`; output goes through the test harness capture.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, RecordingEmitter};
