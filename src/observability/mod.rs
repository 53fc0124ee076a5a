//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline stages produce:
//!     → request_log.rs (raw dumps / JSON records, stdout by default)
//!     → logging.rs (structured diagnostics via tracing, stderr)
//! ```
//!
//! # Design Decisions
//! - Request records and diagnostics never share a stream
//! - Record writes are serialized so concurrent requests stay readable

pub mod logging;
pub mod request_log;

pub use request_log::RequestLog;
