//! Failure simulation state machine.
//!
//! # States
//! - Failing: `failure_index < failure_count`, returns the failure code
//! - Succeeding: failure run exhausted, `success_index < success_count`
//! - Idle: both runs exhausted (only reachable when both counts are 0)
//!
//! # State Transitions
//! ```text
//! Failing → Succeeding: failure run complete, success_count > 0 (success_index := 0)
//! Failing → Failing:    failure run complete, success_count == 0 (failure_index := 0)
//! Succeeding → Failing: success run complete, failure_count > 0 (failure_index := 0)
//! Succeeding → Succeeding: success run complete, failure_count == 0 (success_index := 0)
//! ```

use axum::http::StatusCode;
use serde::Serialize;

/// Mutable counters of the simulator. Only ever touched under its lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FailureState {
    /// Position within the current failure run.
    pub failure_index: u32,
    /// Position within the current success run.
    pub success_index: u32,
    /// Whether the most recent invocation produced a failure.
    pub last_was_failure: bool,
}

/// Result of one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub status: StatusCode,
    pub failed: bool,
}

impl Outcome {
    pub fn failure(status: StatusCode) -> Self {
        Self { status, failed: true }
    }

    pub fn success(status: StatusCode) -> Self {
        Self { status, failed: false }
    }
}

impl FailureState {
    /// Advance the cycle by one invocation.
    pub(crate) fn step(
        &mut self,
        failure_count: u32,
        success_count: u32,
        failure: StatusCode,
        success: StatusCode,
    ) -> Outcome {
        if self.failure_index < failure_count {
            self.failure_index += 1;
            self.last_was_failure = true;

            if self.failure_index == failure_count {
                // With no success run the failure run simply restarts.
                if success_count > 0 {
                    self.success_index = 0;
                } else {
                    self.failure_index = 0;
                }
            }
            Outcome::failure(failure)
        } else if self.success_index < success_count {
            self.success_index += 1;
            self.last_was_failure = false;

            if self.success_index == success_count {
                if failure_count > 0 {
                    self.failure_index = 0;
                } else {
                    self.success_index = 0;
                }
            }
            Outcome::success(success)
        } else {
            Outcome::success(success)
        }
    }
}
