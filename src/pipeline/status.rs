//! Fixed response code.

use axum::http::StatusCode;
use futures_util::future::BoxFuture;

use crate::pipeline::{Exchange, Next, Stage};

/// Writes the configured status and nothing else.
#[derive(Debug, Clone, Copy)]
pub struct StatusStage {
    status: StatusCode,
}

impl StatusStage {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }
}

impl Stage for StatusStage {
    fn name(&self) -> &'static str {
        "response-code"
    }

    fn handle<'a>(&'a self, exchange: &'a mut Exchange, next: Next<'a>) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            exchange.response.write_status(self.status);
            next.run(exchange).await;
        })
    }
}
