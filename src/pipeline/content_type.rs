//! Response content headers for log mode.

use axum::http::{header, HeaderValue};
use futures_util::future::BoxFuture;

use crate::config::LogFormat;
use crate::pipeline::{Exchange, Next, Stage};

/// Sets `Content-Type` to match the request log format before any status is written.
#[derive(Debug, Clone, Copy)]
pub struct ContentTypeStage {
    format: LogFormat,
}

impl ContentTypeStage {
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }

    fn content_type(&self) -> HeaderValue {
        if self.format.is_json() {
            HeaderValue::from_static("application/json")
        } else {
            HeaderValue::from_static("text/plain; charset=utf-8")
        }
    }
}

impl Stage for ContentTypeStage {
    fn name(&self) -> &'static str {
        "content-type"
    }

    fn handle<'a>(&'a self, exchange: &'a mut Exchange, next: Next<'a>) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            exchange
                .response
                .set_header(header::CONTENT_TYPE, self.content_type());
            next.run(exchange).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support;
    use axum::http::Method;

    async fn content_type_for(format: LogFormat) -> HeaderValue {
        let pipeline = test_support::single(ContentTypeStage::new(format));
        let mut exchange = test_support::exchange(Method::GET, "/", "");
        pipeline.dispatch(&mut exchange).await;
        exchange.response.headers()[header::CONTENT_TYPE].clone()
    }

    #[tokio::test]
    async fn test_content_type_follows_format() {
        assert_eq!(content_type_for(LogFormat::Raw).await, "text/plain; charset=utf-8");
        assert_eq!(content_type_for(LogFormat::Json).await, "application/json");
        assert_eq!(content_type_for(LogFormat::JsonPretty).await, "application/json");
    }
}
