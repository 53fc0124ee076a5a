//! Artificial response delay.

use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::pipeline::{Exchange, Next, Stage};

/// Suspends the current request before continuing down the chain.
///
/// Only this request's task sleeps; the runtime keeps serving others.
#[derive(Debug, Clone, Copy)]
pub struct DelayStage {
    delay: Duration,
}

impl DelayStage {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Stage for DelayStage {
    fn name(&self) -> &'static str {
        "delay"
    }

    fn handle<'a>(&'a self, exchange: &'a mut Exchange, next: Next<'a>) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            next.run(exchange).await;
        })
    }
}
