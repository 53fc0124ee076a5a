//! Transient failure simulation subsystem.
//!
//! # Data Flow
//! ```text
//! Request enters failure stage
//!     → simulator.rs (lock, step, unlock)
//!     → state.rs (cycle counters)
//!     → Outcome travels with the request to later stages
//! ```
//!
//! # Design Decisions
//! - One mutex covers the whole read-decide-mutate step
//! - Outcome is returned to the caller rather than read back from shared state,
//!   so concurrent requests never observe each other's result

pub mod simulator;
pub mod state;

pub use simulator::FailureSimulator;
pub use state::{FailureState, Outcome};
