//! HTTP Rake (`httpr`)
//!
//! A developer tool that either logs every incoming HTTP request and answers
//! with a configurable response, or reverse-proxies all traffic to one
//! upstream while logging it. Both modes can inject deterministic
//! failure/success cycles and a fixed latency.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::listener ─▶ http::server ─▶ pipeline
//!                       (+ net::tls)                      │
//!                                                         ▼
//!                         ┌─────────────────────────────────────────────┐
//!                         │ log:   content-type → code|failure          │
//!                         │        → logging → delay                    │
//!                         │ proxy: [failure] → logging → delay → proxy ─┼──▶ Upstream
//!                         └─────────────────────────────────────────────┘
//!                                      │                 │
//!                                      ▼                 ▼
//!                              request log (stdout)   simulation
//!                                                    (shared counters)
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod pipeline;
pub mod simulation;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod state;

pub use config::ServerConfig;
pub use error::Error;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use state::SharedState;
