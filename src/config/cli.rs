//! Command line surface.
//!
//! Translates parsed arguments into a validated [`ServerConfig`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use url::Url;

use crate::config::schema::{FailureConfig, ListenerConfig, LogFormat, ServerConfig, TlsConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for building a configuration from the command line.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid upstream URL '{url}': {source}")]
    Upstream {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Parser)]
#[command(name = "httpr", version)]
#[command(about = "A simple HTTP server for examining and testing HTTP requests")]
#[command(
    long_about = "HTTP Rake (httpr) is a compact and flexible HTTP server that is useful for \
examining and testing HTTP requests without the need to configure and deploy a full-fledged \
Web server or a proxy."
)]
pub struct Cli {
    /// HTTP service address
    #[arg(short = 's', long = "http", default_value = ":8081", global = true)]
    pub http: String,

    /// Serve HTTPS instead of HTTP
    #[arg(long, global = true)]
    pub tls: bool,

    /// TLS certificate file (PEM); a self-signed one is generated when absent
    #[arg(long, global = true)]
    pub cert: Option<PathBuf>,

    /// TLS private key file (PEM)
    #[arg(long, global = true)]
    pub key: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log the incoming HTTP requests
    Log(LogArgs),
    /// Proxy HTTP requests to an upstream server
    Proxy(ProxyArgs),
    /// Print the version number
    Version,
}

#[derive(Debug, Args)]
pub struct FormatArgs {
    /// Log HTTP requests in JSON format
    #[arg(short = 'j', long, conflicts_with = "json_pp")]
    pub json: bool,

    /// Log HTTP requests in pretty-printed (indented) JSON format
    #[arg(short = 'p', long = "json-pp")]
    pub json_pp: bool,
}

impl FormatArgs {
    fn format(&self) -> LogFormat {
        if self.json_pp {
            LogFormat::JsonPretty
        } else if self.json {
            LogFormat::Json
        } else {
            LogFormat::Raw
        }
    }
}

#[derive(Debug, Args)]
pub struct FailureArgs {
    /// Simulate a transient failure: return an error code before a successful response
    #[arg(short = 'f', long)]
    pub simulate_failure: bool,

    /// How many errors are returned before a successful response
    #[arg(long, default_value_t = 1)]
    pub simulate_failure_count: u32,

    /// How many successful responses are returned before returning an error code
    #[arg(long, default_value_t = 1)]
    pub simulate_success_count: u32,

    /// HTTP status code for an error response
    #[arg(long, default_value_t = 500)]
    pub simulate_failure_code: u16,
}

impl From<&FailureArgs> for FailureConfig {
    fn from(args: &FailureArgs) -> Self {
        Self {
            enabled: args.simulate_failure,
            failure_count: args.simulate_failure_count,
            success_count: args.simulate_success_count,
            failure_code: args.simulate_failure_code,
        }
    }
}

#[derive(Debug, Args)]
pub struct LogArgs {
    #[command(flatten)]
    pub format: FormatArgs,

    /// Send the logged contents back to the HTTP client
    #[arg(short = 'e', long)]
    pub echo: bool,

    /// Send the specified HTTP status code back to the client
    #[arg(short = 'r', long, default_value_t = 200)]
    pub response_code: u16,

    /// Delay, in milliseconds, when replying to incoming HTTP requests
    #[arg(short = 'd', long, default_value_t = 0)]
    pub delay: u64,

    #[command(flatten)]
    pub failure: FailureArgs,
}

#[derive(Debug, Args)]
pub struct ProxyArgs {
    /// Upstream server URL
    #[arg(value_name = "UPSTREAM_URL")]
    pub upstream: String,

    #[command(flatten)]
    pub format: FormatArgs,

    /// Delay, in milliseconds, before proxying the request upstream
    #[arg(short = 'd', long, default_value_t = 0)]
    pub delay: u64,

    #[command(flatten)]
    pub failure: FailureArgs,

    /// Ignore upstream TLS certificate errors
    #[arg(short = 'k', long)]
    pub insecure: bool,
}

impl Cli {
    /// Build the run profile for the selected command.
    ///
    /// Returns `Ok(None)` for commands that do not start a server.
    pub fn into_config(self) -> Result<Option<ServerConfig>, ConfigError> {
        let listener = ListenerConfig {
            bind_address: normalize_address(&self.http),
            tls: (self.tls || self.cert.is_some() || self.key.is_some()).then(|| TlsConfig {
                cert_path: self.cert,
                key_path: self.key,
            }),
        };

        let config = match self.command {
            Command::Version => return Ok(None),
            Command::Log(args) => ServerConfig {
                listener,
                upstream: None,
                log_format: args.format.format(),
                echo: args.echo,
                response_code: args.response_code,
                delay_ms: args.delay,
                insecure_upstream_tls: false,
                failure: FailureConfig::from(&args.failure),
            },
            Command::Proxy(args) => {
                let upstream = Url::parse(&args.upstream).map_err(|source| ConfigError::Upstream {
                    url: args.upstream.clone(),
                    source,
                })?;
                ServerConfig {
                    listener,
                    upstream: Some(upstream),
                    log_format: args.format.format(),
                    echo: false,
                    response_code: 200,
                    delay_ms: args.delay,
                    insecure_upstream_tls: args.insecure,
                    failure: FailureConfig::from(&args.failure),
                }
            }
        };

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(Some(config))
    }
}

/// Expand a bare `:port` into an all-interfaces socket address.
pub fn normalize_address(address: &str) -> String {
    match address.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => address.to_string(),
    }
}
