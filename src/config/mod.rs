//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line
//!     → cli.rs (parse flags & subcommand)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc<SharedState> to the pipeline and server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once built; there is no runtime reload
//! - All fields have defaults matching the command line defaults
//! - Validation separates syntactic (clap) from semantic checks

pub mod cli;
pub mod schema;
pub mod validation;

pub use cli::{Cli, Command, ConfigError};
pub use schema::{FailureConfig, ListenerConfig, LogFormat, ServerConfig, TlsConfig};
pub use validation::{validate_config, ValidationError};
