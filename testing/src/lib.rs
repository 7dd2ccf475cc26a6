//! # Shopfront Testing
//!
//! Testing utilities and helpers for the Shopfront architecture.
//!
//! This crate provides:
//! - A controllable clock for session expiry and order timestamps
//! - A Given-When-Then harness for reducers
//! - Helpers that run effect descriptions without a store
//! - Assertion helpers for reducer effects
//!
//! ## Example
//!
//! ```ignore
//! use shopfront_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(CartReducer)
//!     .with_env(test_environment())
//!     .given_state(CartState::default())
//!     .when_action(ShopAction::AddToCart { product })
//!     .then_state(|cart| assert_eq!(cart.len(), 1))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use shopfront_core::environment::Clock;


pub use reducer_test::{Outcome, ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Returns the same time until moved with [`FixedClock::advance`] or
    /// [`FixedClock::set`]. Clones share the same time, so a test can keep a
    /// handle while the environment owns another.
    ///
    /// # Example
    ///
    /// ```
    /// use shopfront_testing::mocks::FixedClock;
    /// use shopfront_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// assert_eq!(time1, clock.now());
    ///
    /// clock.advance(Duration::minutes(5));
    /// assert_eq!(clock.now() - time1, Duration::minutes(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock to an absolute time
        pub fn set(&self, time: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = time;
        }

        /// Move the clock forward
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Test helpers and utilities
pub mod helpers {
    use shopfront_core::effect::Effect;

    /// Run effect descriptions to completion and collect the actions they produce
    ///
    /// Futures are awaited in order. Delays yield their action immediately
    /// without sleeping. Nothing is fed back into a reducer.
    pub async fn resolve_effects<A, I>(effects: I) -> Vec<A>
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut actions = Vec::new();

        for effect in effects {
            match effect {
                Effect::None => {},
                Effect::Future(fut) => {
                    if let Some(action) = fut.await {
                        actions.push(action);
                    }
                },
                Effect::Delay { action, .. } => actions.push(*action),
            }
        }

        actions
    }
}

// Re-export commonly used items
pub use helpers::resolve_effects;
pub use mocks::{FixedClock, test_clock};
