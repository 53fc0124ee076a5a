//! Process-wide shared state.
//!
//! Built once at startup and handed to the pipeline builder and the server.
//! Everything except the simulator counters is read-only after construction.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::observability::RequestLog;
use crate::simulation::FailureSimulator;

/// Configuration, failure counters and request log sink for one server lifetime.
#[derive(Debug)]
pub struct SharedState {
    pub config: ServerConfig,
    pub simulator: Arc<FailureSimulator>,
    pub request_log: RequestLog,
}

impl SharedState {
    /// Create the state logging to standard output.
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Self::with_request_log(config, RequestLog::stdout())
    }

    pub fn with_request_log(config: ServerConfig, request_log: RequestLog) -> Arc<Self> {
        let simulator = Arc::new(FailureSimulator::from_config(&config));
        Arc::new(Self {
            config,
            simulator,
            request_log,
        })
    }
}
