//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → listener.rs (bind the configured address)
//!     → tls.rs (optional: load PEM files or generate a self-signed CA)
//!     → Hand off to HTTP layer (plain or rustls acceptor)
//! ```
//!
//! # Design Decisions
//! - TLS is optional and handled transparently by the server
//! - Certificate problems abort startup instead of downgrading to plaintext

pub mod listener;
pub mod tls;
