//! Request processing pipeline.
//!
//! # Data Flow
//! ```text
//! Log mode:
//!     content_type → status | failure → logging → delay
//!
//! Proxy mode:
//!     [failure] → logging → delay → proxy
//! ```
//!
//! Each stage receives the exchange and the rest of the chain. It may act
//! before calling `next`, after it, or skip it entirely.
//!
//! # Design Decisions
//! - Stages are typed objects behind one trait, assembled by builder.rs
//! - The exchange carries the failure outcome of *this* request downstream
//! - The response is accumulated in a sink and finalized once the chain unwinds

pub mod builder;
pub mod content_type;
pub mod delay;
pub mod failure;
pub mod logging;
pub mod proxy;
pub mod status;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    http::{header, Request},
    response::Response,
};
use futures_util::future::BoxFuture;

use crate::http::response::ResponseSink;
use crate::simulation::Outcome;

pub use builder::PipelineBuilder;

/// Upper bound on a buffered request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// One inbound request and the response being built for it.
#[derive(Debug)]
pub struct Exchange {
    pub request: Request<Body>,
    pub remote_addr: SocketAddr,
    pub response: ResponseSink,
    /// Failure simulation result for this request, if the stage ran.
    pub outcome: Option<Outcome>,
}

impl Exchange {
    pub fn new(request: Request<Body>, remote_addr: SocketAddr) -> Self {
        Self {
            request,
            remote_addr,
            response: ResponseSink::new(),
            outcome: None,
        }
    }

    /// True when failure simulation decided this request fails.
    pub fn failure_simulated(&self) -> bool {
        self.outcome.is_some_and(|outcome| outcome.failed)
    }

    /// Read the request body once and reset it so the next reader sees the same bytes.
    ///
    /// A read failure is logged and treated as an empty body; the declared
    /// `Content-Length` is dropped with it so the request stays well framed.
    pub async fn buffer_body(&mut self) -> Bytes {
        let body = std::mem::take(self.request.body_mut());
        let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    remote_addr = %self.remote_addr,
                    error = %e,
                    "Error reading request body"
                );
                self.request.headers_mut().remove(header::CONTENT_LENGTH);
                Bytes::new()
            }
        };
        *self.request.body_mut() = Body::from(bytes.clone());
        bytes
    }
}

/// A single request-handling behavior in the chain.
pub trait Stage: Send + Sync + 'static {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    fn handle<'a>(&'a self, exchange: &'a mut Exchange, next: Next<'a>) -> BoxFuture<'a, ()>;
}

/// The remainder of the chain after the current stage.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Arc<dyn Stage>],
}

impl<'a> Next<'a> {
    /// Run the remaining stages. A no-op at the end of the chain.
    pub fn run<'b>(self, exchange: &'b mut Exchange) -> BoxFuture<'b, ()>
    where
        'a: 'b,
    {
        match self.stages.split_first() {
            Some((stage, rest)) => stage.handle(exchange, Next { stages: rest }),
            None => Box::pin(async {}),
        }
    }
}

/// The composed entry point: stages ordered outermost first.
#[derive(Clone)]
pub struct Pipeline {
    stages: Arc<[Arc<dyn Stage>]>,
}

impl Pipeline {
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> Self {
        Self {
            stages: stages.into(),
        }
    }

    /// Stage names, outermost first.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Drive an exchange through every stage.
    pub async fn dispatch(&self, exchange: &mut Exchange) {
        Next {
            stages: &self.stages[..],
        }
        .run(exchange)
        .await
    }

    /// Handle one request end to end.
    pub async fn serve(&self, request: Request<Body>, remote_addr: SocketAddr) -> Response {
        let mut exchange = Exchange::new(request, remote_addr);
        self.dispatch(&mut exchange).await;
        exchange.response.into_response()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.stage_names()).finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::http::Method;

    pub fn exchange(method: Method, uri: &str, body: &'static str) -> Exchange {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("host", "localhost:8081")
            .body(Body::from(body))
            .unwrap();
        Exchange::new(request, "127.0.0.1:40000".parse().unwrap())
    }

    pub fn single(stage: impl Stage) -> Pipeline {
        let stage: Arc<dyn Stage> = Arc::new(stage);
        Pipeline::new(vec![stage])
    }

    pub async fn body_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
