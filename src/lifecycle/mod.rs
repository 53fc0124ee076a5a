//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → resolve the wait future
//!
//! Shutdown (shutdown.rs):
//!     Trigger → broadcast to the server → stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - One broadcast channel; the server is just another subscriber
//! - HTTPS drains for a bounded grace period, plain HTTP until idle

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
