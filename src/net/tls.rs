//! TLS configuration and certificate bootstrap.
//!
//! # Responsibilities
//! - Load a certificate/key pair from PEM files when both are given
//! - Fall back to generation when only one of the two is given
//! - Otherwise generate an ephemeral self-signed certificate authority
//!   bound to 127.0.0.1 and print it for the operator
//!
//! # Design Decisions
//! - The generated pair lives in memory only and is regenerated per start
//! - Any failure here is fatal; there is no fallback to plaintext

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;
use rand::RngCore;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose,
    IsCa, KeyPair, KeyUsagePurpose, SanType, SerialNumber, PKCS_RSA_SHA256,
};
use thiserror::Error;
use time::OffsetDateTime;

use crate::config::TlsConfig;

/// Organization name stamped on generated certificates.
pub const ORGANIZATION: &str = "HTTP Rake - httpr";

/// Validity of a generated certificate.
pub const VALIDITY_DAYS: i64 = 365;

const SERIAL_NUMBER_BYTES: usize = 16;

/// Error type for TLS setup.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("certificate file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to generate self-signed certificate: {0}")]
    Generate(#[from] rcgen::Error),
    #[error("failed to load TLS configuration: {0}")]
    Load(#[from] std::io::Error),
    #[error("certificate generation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A generated certificate and its private key.
#[derive(Debug, Clone)]
pub struct SelfSignedBundle {
    pub cert_pem: String,
    pub key_pem: String,
    pub cert_der: Vec<u8>,
}

/// Build the listener TLS configuration.
///
/// Uses the supplied files when both paths are set, a fresh self-signed
/// certificate otherwise.
pub async fn load_tls_config(tls: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    match (&tls.cert_path, &tls.key_path) {
        (Some(cert_path), Some(key_path)) => return load_from_files(cert_path, key_path).await,
        (None, None) => {}
        (cert, key) => tracing::warn!(
            cert = ?cert,
            key = ?key,
            "Certificate and key must both be given, generating a self-signed certificate"
        ),
    }

    // RSA key generation is CPU bound.
    let bundle = tokio::task::spawn_blocking(generate_self_signed).await??;
    println!("{}", bundle.cert_pem);
    tracing::info!(organization = ORGANIZATION, "Generated self-signed TLS certificate");

    let config = RustlsConfig::from_pem(
        bundle.cert_pem.into_bytes(),
        bundle.key_pem.into_bytes(),
    )
    .await?;
    Ok(config)
}

async fn load_from_files(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, TlsError> {
    for path in [cert_path, key_path] {
        if !path.exists() {
            return Err(TlsError::NotFound(path.to_path_buf()));
        }
    }
    tracing::info!(cert = ?cert_path, key = ?key_path, "Loading TLS certificate");
    Ok(RustlsConfig::from_pem_file(cert_path, key_path).await?)
}

/// Generate an RSA-2048 self-signed CA certificate valid for one year.
pub fn generate_self_signed() -> Result<SelfSignedBundle, TlsError> {
    let key_pair = KeyPair::generate_for(&PKCS_RSA_SHA256)?;

    let mut serial = [0u8; SERIAL_NUMBER_BYTES];
    rand::thread_rng().fill_bytes(&mut serial);

    let mut distinguished_name = DistinguishedName::new();
    distinguished_name.push(DnType::OrganizationName, ORGANIZATION);

    let now = OffsetDateTime::now_utc();

    let mut params = CertificateParams::default();
    params.serial_number = Some(SerialNumber::from_slice(&serial));
    params.distinguished_name = distinguished_name;
    params.not_before = now;
    params.not_after = now + time::Duration::days(VALIDITY_DAYS);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::DigitalSignature,
    ];
    params.extended_key_usages = vec![
        ExtendedKeyUsagePurpose::ServerAuth,
        ExtendedKeyUsagePurpose::ClientAuth,
    ];
    params.subject_alt_names = vec![SanType::IpAddress(IpAddr::V4(Ipv4Addr::LOCALHOST))];

    let cert = params.self_signed(&key_pair)?;

    Ok(SelfSignedBundle {
        cert_pem: cert.pem(),
        key_pem: key_pair.serialize_pem(),
        cert_der: cert.der().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use x509_parser::extensions::GeneralName;
    use x509_parser::parse_x509_certificate;
    use x509_parser::public_key::PublicKey;

    #[test]
    fn test_self_signed_certificate_properties() {
        let bundle = generate_self_signed().unwrap();
        let (_, cert) = parse_x509_certificate(&bundle.cert_der).unwrap();

        match cert.public_key().parsed().unwrap() {
            PublicKey::RSA(rsa) => assert!(rsa.key_size() >= 2048),
            _ => panic!("expected an RSA public key"),
        }

        let day = 24 * 60 * 60;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let not_after = cert.validity().not_after.timestamp();
        assert!(not_after >= now + 364 * day);
        assert!(not_after <= now + 366 * day);

        assert!(cert.is_ca());
        assert_eq!(cert.issuer().to_string(), cert.subject().to_string());
        let organization = cert.subject().iter_organization().next().unwrap();
        assert_eq!(organization.as_str().unwrap(), ORGANIZATION);

        let san = cert.subject_alternative_name().unwrap().unwrap();
        assert!(san
            .value
            .general_names
            .iter()
            .any(|name| matches!(name, GeneralName::IPAddress(ip) if **ip == [127, 0, 0, 1])));

        assert!(bundle.cert_pem.starts_with("-----BEGIN CERTIFICATE-----"));
        assert!(bundle.key_pem.contains("PRIVATE KEY"));
    }

    #[test]
    fn test_serial_numbers_differ() {
        let a = generate_self_signed().unwrap();
        let b = generate_self_signed().unwrap();
        let (_, a) = parse_x509_certificate(&a.cert_der).unwrap();
        let (_, b) = parse_x509_certificate(&b.cert_der).unwrap();
        assert_ne!(a.raw_serial(), b.raw_serial());
    }

    #[tokio::test]
    async fn test_generated_config_loads() {
        assert!(load_tls_config(&TlsConfig::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_supplied_files_load() {
        let bundle = generate_self_signed().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cert_path = dir.path().join("cert.pem");
        let key_path = dir.path().join("key.pem");
        std::fs::write(&cert_path, &bundle.cert_pem).unwrap();
        std::fs::write(&key_path, &bundle.key_pem).unwrap();

        let tls = TlsConfig {
            cert_path: Some(cert_path),
            key_path: Some(key_path),
        };
        assert!(load_tls_config(&tls).await.is_ok());
    }

    #[tokio::test]
    async fn test_half_key_pair_falls_back_to_generated() {
        let tls = TlsConfig {
            cert_path: Some("/nonexistent/cert.pem".into()),
            key_path: None,
        };
        assert!(load_tls_config(&tls).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_files_rejected() {
        let tls = TlsConfig {
            cert_path: Some("/nonexistent/cert.pem".into()),
            key_path: Some("/nonexistent/key.pem".into()),
        };
        assert!(matches!(
            load_tls_config(&tls).await,
            Err(TlsError::NotFound(_))
        ));
    }
}
