//! Deterministic transient failure simulator.
//!
//! # Responsibilities
//! - Produce a status code per request from configured failure/success run lengths
//! - Serialize every read-decide-mutate step behind one lock
//! - Expose the most recent outcome for inspection
//!
//! # Quirk
//! A success run length of 0 makes the failure run restart forever instead of
//! oscillating. This mirrors the long-standing behavior of the tool.

use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::http::StatusCode;

use crate::config::ServerConfig;
use crate::simulation::state::{FailureState, Outcome};

/// Cyclic failure/success generator shared by all requests.
#[derive(Debug)]
pub struct FailureSimulator {
    enabled: bool,
    failure_count: u32,
    success_count: u32,
    failure_code: StatusCode,
    success_code: StatusCode,
    state: Mutex<FailureState>,
}

impl FailureSimulator {
    /// Create a simulator with explicit parameters.
    pub fn new(
        failure_count: u32,
        success_count: u32,
        failure_code: StatusCode,
        success_code: StatusCode,
    ) -> Self {
        Self {
            enabled: true,
            failure_count,
            success_count,
            failure_code,
            success_code,
            state: Mutex::new(FailureState::default()),
        }
    }

    /// Create a simulator from the run profile.
    pub fn from_config(config: &ServerConfig) -> Self {
        let mut simulator = Self::new(
            config.failure.failure_count,
            config.failure.success_count,
            config.failure.status(),
            config.status(),
        );
        simulator.enabled = config.failure.enabled;
        simulator
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Run one simulation step.
    ///
    /// A disabled simulator always reports the success code and leaves its
    /// counters untouched.
    pub fn simulate(&self) -> Outcome {
        if !self.enabled {
            return Outcome::success(self.success_code);
        }

        let outcome = self.lock().step(
            self.failure_count,
            self.success_count,
            self.failure_code,
            self.success_code,
        );

        tracing::debug!(
            status = outcome.status.as_u16(),
            failed = outcome.failed,
            "Failure simulation step"
        );
        outcome
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> FailureState {
        *self.lock()
    }

    /// Whether the most recent invocation, from any request, was a failure.
    pub fn last_was_failure(&self) -> bool {
        self.enabled && self.lock().last_was_failure
    }

    fn lock(&self) -> MutexGuard<'_, FailureState> {
        // The counters stay consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
