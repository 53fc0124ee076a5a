//! Configuration schema definitions.
//!
//! This module defines the complete run profile for the server. All types
//! derive Serde traits so the validated profile can be dumped at startup.

use std::path::PathBuf;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Upstream target. Present only in proxy mode.
    pub upstream: Option<Url>,

    /// Format used for the request log.
    pub log_format: LogFormat,

    /// Write the logged request back to the client.
    pub echo: bool,

    /// Status returned when failure simulation does not decide it.
    pub response_code: u16,

    /// Artificial delay applied to every request, in milliseconds.
    pub delay_ms: u64,

    /// Skip upstream certificate validation (proxy mode only).
    pub insecure_upstream_tls: bool,

    /// Transient failure simulation.
    pub failure: FailureConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: None,
            log_format: LogFormat::Raw,
            echo: false,
            response_code: 200,
            delay_ms: 0,
            insecure_upstream_tls: false,
            failure: FailureConfig::default(),
        }
    }
}

impl ServerConfig {
    /// True when requests are forwarded to an upstream.
    pub fn is_proxy(&self) -> bool {
        self.upstream.is_some()
    }

    /// Configured response code as a typed status.
    ///
    /// Falls back to `200 OK` for values that never passed validation.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.response_code).unwrap_or(StatusCode::OK)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
///
/// When either path is missing a self-signed certificate is generated.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: Option<PathBuf>,

    /// Path to private key file (PEM).
    pub key_path: Option<PathBuf>,
}

/// Request log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    Raw,
    Json,
    JsonPretty,
}

impl LogFormat {
    pub fn is_json(self) -> bool {
        matches!(self, LogFormat::Json | LogFormat::JsonPretty)
    }
}

/// Failure simulation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FailureConfig {
    /// Enable the failure simulation stage.
    pub enabled: bool,

    /// Consecutive failures in one cycle.
    pub failure_count: u32,

    /// Consecutive successes in one cycle.
    pub success_count: u32,

    /// Status returned during the failure run.
    pub failure_code: u16,
}

impl Default for FailureConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            failure_count: 1,
            success_count: 1,
            failure_code: 500,
        }
    }
}

impl FailureConfig {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.failure_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
