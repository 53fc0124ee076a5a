//! Request capture for the request log.
//!
//! # Responsibilities
//! - Render a plain text dump of a request (request line, headers, body)
//! - Build the flat JSON record of a request
//!
//! # Design Decisions
//! - Both renderings take the already buffered body; they never touch the stream
//! - Host is always rendered first in the raw dump
//! - Non UTF-8 header values and bodies are rendered lossily

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::http::{header, HeaderMap, Request};
use serde::Serialize;

/// Render the raw text form of a request, including the remote address line.
pub fn dump_raw<B>(request: &Request<B>, remote_addr: SocketAddr, body: &[u8]) -> Vec<u8> {
    let mut out = format!("Remote address: {}\n", remote_addr).into_bytes();

    let uri = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    out.extend_from_slice(
        format!("{} {} {:?}\r\n", request.method(), uri, request.version()).as_bytes(),
    );

    if let Some(host) = host_of(request) {
        out.extend_from_slice(format!("Host: {}\r\n", host).as_bytes());
    }
    for (name, value) in request.headers() {
        if name == header::HOST {
            continue;
        }
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out.push(b'\n');
    out
}

/// Flat JSON shape of a logged request. Empty fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestRecord {
    #[serde(rename = "remoteAddr", skip_serializing_if = "String::is_empty")]
    pub remote_addr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub proto: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub header: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transfer_encoding: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl RequestRecord {
    /// Capture a request and its buffered body.
    pub fn capture<B>(request: &Request<B>, remote_addr: SocketAddr, body: &[u8]) -> Self {
        let headers = request.headers();
        Self {
            remote_addr: remote_addr.to_string(),
            host: host_of(request).unwrap_or_default(),
            method: request.method().to_string(),
            url: request
                .uri()
                .path_and_query()
                .map(|pq| pq.to_string())
                .unwrap_or_else(|| request.uri().to_string()),
            proto: format!("{:?}", request.version()),
            header: header_map(headers),
            content_length: headers
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok()),
            transfer_encoding: headers
                .get_all(header::TRANSFER_ENCODING)
                .iter()
                .flat_map(|v| {
                    String::from_utf8_lossy(v.as_bytes())
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>()
                })
                .collect(),
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// Serialize the record, compact or with 4-space indentation.
    pub fn to_json(&self, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
        if !pretty {
            return serde_json::to_vec(self);
        }
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}

fn host_of<B>(request: &Request<B>) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        map.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    map
}
