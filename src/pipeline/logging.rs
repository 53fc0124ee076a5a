//! Request logging stage.
//!
//! # Responsibilities
//! - Read the buffered request body without consuming it
//! - Render the request as a raw dump or JSON record
//! - Append the rendering to the request log and optionally echo it
//!
//! # Design Decisions
//! - A body read error is logged and replaced by an empty body
//! - A serialization error fails this request with 500, never the process
//! - Failed (simulated) requests are never echoed

use axum::http::{header, HeaderValue, StatusCode};
use futures_util::future::BoxFuture;

use crate::config::LogFormat;
use crate::http::request::{dump_raw, RequestRecord};
use crate::observability::RequestLog;
use crate::pipeline::{Exchange, Next, Stage};

/// Logs every request to the request log.
#[derive(Debug, Clone)]
pub struct LoggingStage {
    format: LogFormat,
    echo: bool,
    log: RequestLog,
}

impl LoggingStage {
    pub fn new(format: LogFormat, echo: bool, log: RequestLog) -> Self {
        Self { format, echo, log }
    }

    fn render(&self, exchange: &Exchange, body: &[u8]) -> Result<Vec<u8>, serde_json::Error> {
        match self.format {
            LogFormat::Raw => Ok(dump_raw(&exchange.request, exchange.remote_addr, body)),
            LogFormat::Json | LogFormat::JsonPretty => {
                let record = RequestRecord::capture(&exchange.request, exchange.remote_addr, body);
                let mut rendered = record.to_json(self.format == LogFormat::JsonPretty)?;
                rendered.push(b'\n');
                Ok(rendered)
            }
        }
    }
}

impl Stage for LoggingStage {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn handle<'a>(&'a self, exchange: &'a mut Exchange, next: Next<'a>) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let body = exchange.buffer_body().await;

            let rendered = match self.render(exchange, &body) {
                Ok(rendered) => rendered,
                Err(e) => {
                    tracing::error!(
                        remote_addr = %exchange.remote_addr,
                        error = %e,
                        "Failed to serialize request"
                    );
                    exchange
                        .response
                        .fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to serialize request");
                    return;
                }
            };

            self.log.write_record(&rendered);

            if self.echo && !exchange.failure_simulated() {
                if self.format.is_json() {
                    exchange.response.set_header(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    );
                }
                exchange.response.write_body(&rendered);
            }

            next.run(exchange).await;
        })
    }
}
