//! Top-level error type for the `httpr` binary.

use thiserror::Error;

use crate::config::ConfigError;
use crate::http::ServerError;
use crate::net::listener::ListenerError;

/// Any error that aborts the process.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error(transparent)]
    Server(#[from] ServerError),
}
