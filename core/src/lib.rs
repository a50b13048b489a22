//! # Servir Core
//!
//! Core traits and types for the Servir client architecture.
//!
//! The client keeps all shared application state in a single container and
//! changes it only through actions. Everything that talks to the outside
//! world (HTTP, timers, notifications) is described as an effect or injected
//! through the environment.
//!
//! ## Core Concepts
//!
//! - **State**: Application state tree (loading flags, per-module request status)
//! - **Action**: All possible inputs to a reducer (user intents, API signals)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Example
//!
//! ```
//! use servir_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct ControlState {
//!     loading: bool,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum ControlAction {
//!     SetLoading(bool),
//! }
//!
//! struct ControlReducer;
//!
//! impl Reducer for ControlReducer {
//!     type State = ControlState;
//!     type Action = ControlAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut ControlState,
//!         action: ControlAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<ControlAction>; 4]> {
//!         match action {
//!             ControlAction::SetLoading(loading) => state.loading = loading,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = ControlState { loading: true };
//! let _ = ControlReducer.reduce(&mut state, ControlAction::SetLoading(false), &());
//! assert!(!state.loading);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Reducer composition (`combine_reducers`, `scope_reducer`)
pub mod composition;

/// Declarative macros for building effects
pub mod effect_macros;

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all state-transition logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Updates state in place and returns effect descriptions to be
        /// executed by the runtime. Most actions produce a single
        /// `Effect::None`, hence the inline capacity of four.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (notification dismissal, debounced reloads)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Whether this effect does nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter (or, for the request pipeline, passed
/// in explicitly with each call).
pub mod environment {
    use chrono::{DateTime, Utc};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - uses system clock
    /// let clock = SystemClock;
    ///
    /// // Test - fixed time for deterministic tests
    /// let clock = FixedClock::new(time);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock backed by [`Utc::now`]
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Emitter trait - the capability to dispatch a signal into a state container
    ///
    /// Emission is fire-and-forget from the caller's point of view: the
    /// returned future completes once the signal has been handed to the
    /// container (and its reducer has run), never with an error. Containers
    /// that reject a signal log the rejection themselves.
    ///
    /// # Type Parameters
    ///
    /// - `S`: The signal type being emitted
    pub trait Emitter<S>: Send + Sync {
        /// Emit one signal
        fn emit(&self, signal: S) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
    }

    impl<S, T> Emitter<S> for Arc<T>
    where
        T: Emitter<S> + ?Sized,
    {
        fn emit(&self, signal: S) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            (**self).emit(signal)
        }
    }
}
