//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation of the run profile built from the command line
//! - Validate value ranges (status codes, bind address)
//! - Detect conflicting options (echo while proxying, insecure without upstream)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),
    #[error("{field}: {code} is not a valid HTTP status code")]
    StatusCode { field: &'static str, code: u16 },
    #[error("echo is not supported in proxy mode")]
    EchoWhileProxying,
    #[error("upstream URL '{0}' must be an absolute http or https URL")]
    Upstream(String),
    #[error("insecure upstream TLS only applies in proxy mode")]
    InsecureWithoutUpstream,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !has_port(&config.listener.bind_address) {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    check_status(&mut errors, "response-code", config.response_code);
    check_status(&mut errors, "simulate-failure-code", config.failure.failure_code);

    match &config.upstream {
        Some(url) => {
            if config.echo {
                errors.push(ValidationError::EchoWhileProxying);
            }
            if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
                errors.push(ValidationError::Upstream(url.to_string()));
            }
        }
        None => {
            if config.insecure_upstream_tls {
                errors.push(ValidationError::InsecureWithoutUpstream);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A `host:port` shape. Host names are resolved at bind time.
fn has_port(address: &str) -> bool {
    address
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
}

fn check_status(errors: &mut Vec<ValidationError>, field: &'static str, code: u16) {
    if StatusCode::from_u16(code).is_err() {
        errors.push(ValidationError::StatusCode { field, code });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TlsConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.response_code = 42;
        config.failure.failure_code = 1000;
        config.upstream = Some("ftp://example.com".parse().unwrap());
        config.echo = true;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::EchoWhileProxying));
        assert!(errors.contains(&ValidationError::StatusCode {
            field: "response-code",
            code: 42
        }));
    }

    #[test]
    fn test_half_key_pair_accepted() {
        let mut config = ServerConfig::default();
        config.listener.tls = Some(TlsConfig {
            cert_path: Some("cert.pem".into()),
            key_path: None,
        });
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_host_names_accepted() {
        let mut config = ServerConfig::default();
        for address in ["localhost:8081", "[::1]:8081", "127.0.0.1:0"] {
            config.listener.bind_address = address.into();
            assert!(validate_config(&config).is_ok(), "{}", address);
        }
        for address in ["localhost", ":8081", "localhost:http"] {
            config.listener.bind_address = address.into();
            assert_eq!(
                validate_config(&config).unwrap_err(),
                vec![ValidationError::BindAddress(address.into())]
            );
        }
    }

    #[test]
    fn test_insecure_needs_upstream() {
        let mut config = ServerConfig::default();
        config.insecure_upstream_tls = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InsecureWithoutUpstream]
        );
    }
}
