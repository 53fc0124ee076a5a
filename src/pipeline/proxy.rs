//! Reverse proxy stage.
//!
//! # Responsibilities
//! - Rewrite the request URL onto the single upstream target
//! - Send the request with the upstream's Host header
//! - Hand the upstream response (status, headers, body stream) to the sink
//!
//! # Design Decisions
//! - Requests failed by the simulator are never forwarded
//! - Upstream errors become 502 Bad Gateway
//! - Redirects are passed through to the client, never followed

use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::Response,
};
use futures_util::future::BoxFuture;
use url::Url;

use crate::http::response::strip_hop_by_hop;
use crate::pipeline::{Exchange, Next, Stage};

/// Forwards requests to one upstream.
#[derive(Debug, Clone)]
pub struct ProxyStage {
    upstream: Url,
    client: reqwest::Client,
}

impl ProxyStage {
    /// Build the stage and its HTTP client.
    pub fn new(upstream: Url, insecure: bool) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        if insecure {
            tracing::warn!(upstream = %upstream, "Upstream TLS certificate validation disabled");
        }

        Ok(Self { upstream, client })
    }

    async fn forward(&self, exchange: &mut Exchange) {
        let url = upstream_url(&self.upstream, exchange.request.uri());
        let method = exchange.request.method().clone();
        let body = exchange.buffer_body().await;

        let mut headers = exchange.request.headers().clone();
        strip_hop_by_hop(&mut headers);
        // The client derives Host from the upstream URL.
        headers.remove(header::HOST);
        append_forwarded_for(&mut headers, exchange.remote_addr);

        tracing::debug!(
            method = %method,
            upstream = %url,
            "Proxying request"
        );

        let result = self
            .client
            .request(method, url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await;

        match result {
            Ok(upstream) => {
                let status = upstream.status();
                let headers = upstream.headers().clone();
                let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
                *response.status_mut() = status;
                *response.headers_mut() = headers;
                exchange.response.forward(response);
            }
            Err(e) => {
                tracing::error!(upstream = %url, error = %e, "Upstream error");
                exchange.response.write_status(StatusCode::BAD_GATEWAY);
            }
        }
    }
}

impl Stage for ProxyStage {
    fn name(&self) -> &'static str {
        "proxy"
    }

    fn handle<'a>(&'a self, exchange: &'a mut Exchange, next: Next<'a>) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if !exchange.failure_simulated() {
                self.forward(exchange).await;
            }
            next.run(exchange).await;
        })
    }
}

/// Map an inbound request URI onto the upstream target.
///
/// Paths are joined with exactly one slash; query strings are concatenated.
pub fn upstream_url(target: &Url, uri: &Uri) -> Url {
    let mut url = target.clone();
    url.set_path(&join_paths(target.path(), uri.path()));

    let target_query = target.query().filter(|q| !q.is_empty());
    let request_query = uri.query().filter(|q| !q.is_empty());
    let query = match (target_query, request_query) {
        (Some(a), Some(b)) => Some(format!("{}&{}", a, b)),
        (Some(a), None) => Some(a.to_string()),
        (None, Some(b)) => Some(b.to_string()),
        (None, None) => None,
    };
    url.set_query(query.as_deref());
    url
}

fn join_paths(a: &str, b: &str) -> String {
    match (a.ends_with('/'), b.starts_with('/')) {
        (true, true) => format!("{}{}", a, &b[1..]),
        (false, false) => format!("{}/{}", a, b),
        _ => format!("{}{}", a, b),
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, remote_addr: SocketAddr) {
    let client_ip = remote_addr.ip().to_string();
    let value = match headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        Some(prior) => format!("{}, {}", prior, client_ip),
        None => client_ip,
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert("x-forwarded-for", value);
    }
}
