//! Failure simulation stage.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::pipeline::{Exchange, Next, Stage};
use crate::simulation::FailureSimulator;

/// Runs one simulator step and records the outcome on the exchange.
///
/// In log mode the simulated status is always written. In proxy mode it is
/// only written for failures; successful requests take their status from the
/// upstream response.
#[derive(Debug, Clone)]
pub struct FailureStage {
    simulator: Arc<FailureSimulator>,
    proxy_mode: bool,
}

impl FailureStage {
    pub fn new(simulator: Arc<FailureSimulator>, proxy_mode: bool) -> Self {
        Self {
            simulator,
            proxy_mode,
        }
    }
}

impl Stage for FailureStage {
    fn name(&self) -> &'static str {
        "simulate-failure"
    }

    fn handle<'a>(&'a self, exchange: &'a mut Exchange, next: Next<'a>) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let outcome = self.simulator.simulate();
            exchange.outcome = Some(outcome);

            if !self.proxy_mode || outcome.failed {
                exchange.response.write_status(outcome.status);
            }

            next.run(exchange).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support;
    use axum::http::{Method, StatusCode};

    fn simulator() -> Arc<FailureSimulator> {
        Arc::new(FailureSimulator::new(
            1,
            1,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::OK,
        ))
    }

    #[tokio::test]
    async fn test_log_mode_always_writes_status() {
        let pipeline = test_support::single(FailureStage::new(simulator(), false));

        let mut first = test_support::exchange(Method::GET, "/", "");
        pipeline.dispatch(&mut first).await;
        assert!(first.failure_simulated());
        assert_eq!(first.response.status(), Some(StatusCode::SERVICE_UNAVAILABLE));

        let mut second = test_support::exchange(Method::GET, "/", "");
        pipeline.dispatch(&mut second).await;
        assert!(!second.failure_simulated());
        assert_eq!(second.response.status(), Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_proxy_mode_suppresses_success_status() {
        let pipeline = test_support::single(FailureStage::new(simulator(), true));

        let mut first = test_support::exchange(Method::GET, "/", "");
        pipeline.dispatch(&mut first).await;
        assert_eq!(first.response.status(), Some(StatusCode::SERVICE_UNAVAILABLE));

        let mut second = test_support::exchange(Method::GET, "/", "");
        pipeline.dispatch(&mut second).await;
        assert!(second.outcome.is_some());
        assert_eq!(second.response.status(), None);
    }
}
