//! Response accumulation for the stage pipeline.
//!
//! # Responsibilities
//! - Collect status, headers and body written by individual stages
//! - Accept a forwarded upstream response
//! - Produce the final response once the pipeline unwinds
//!
//! # Design Decisions
//! - The first status write wins; later writes are ignored
//! - Writing body bytes before any status implies 200 OK
//! - Hop-by-hop headers are never copied from an upstream response

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
};

/// Headers that only apply to a single transport hop.
pub static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// Remove hop-by-hop headers, including `Upgrade` and anything named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove(header::UPGRADE);
}

/// Response under construction, shared by every stage of one exchange.
#[derive(Debug, Default)]
pub struct ResponseSink {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
    forwarded: Option<Body>,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status written so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Buffered body bytes written by stages.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Write the status. Only the first write takes effect.
    pub fn write_status(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(current) => {
                tracing::debug!(
                    current = current.as_u16(),
                    ignored = status.as_u16(),
                    "Superfluous status write"
                );
            }
        }
    }

    /// Append body bytes, implying 200 OK when no status was written yet.
    pub fn write_body(&mut self, bytes: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(bytes);
    }

    /// Adopt an upstream response: its status (first write wins), headers and body stream.
    pub fn forward(&mut self, response: Response<Body>) {
        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);

        self.write_status(parts.status);
        let mut last = None;
        for (name, value) in parts.headers {
            // Continuation entries of a multi-valued header carry no name.
            if let Some(name) = name {
                self.headers.remove(&name);
                last = Some(name);
            }
            if let Some(name) = &last {
                self.headers.append(name.clone(), value);
            }
        }
        self.forwarded = Some(body);
    }

    /// Discard everything written so far and answer with an error.
    pub fn fail(&mut self, status: StatusCode, message: &str) {
        self.status = Some(status);
        self.headers.clear();
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.body = message.as_bytes().to_vec();
        self.forwarded = None;
    }

    /// Finalize into an HTTP response.
    pub fn into_response(self) -> Response {
        let body = match self.forwarded {
            Some(body) => body,
            None => Body::from(self.body),
        };
        let mut response = Response::new(body);
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}
