//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, every path and method)
//!     → pipeline (stages)
//!         request.rs (raw dump / JSON record of the request)
//!         response.rs (status, headers, body accumulated by stages)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::RequestRecord;
pub use response::ResponseSink;
pub use server::{HttpServer, ServerError};
