//! Stage chain assembly.
//!
//! # Responsibilities
//! - Choose the stages for the run mode (log vs proxy)
//! - Swap the response-code stage for the failure stage when simulation is on
//! - Order the chain outermost first
//!
//! # Design Decisions
//! - Reads the shared configuration once; the pipeline holds no config reference
//! - Deterministic: the same configuration always yields the same chain

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::pipeline::{
    content_type::ContentTypeStage, delay::DelayStage, failure::FailureStage,
    logging::LoggingStage, proxy::ProxyStage, status::StatusStage, Pipeline, Stage,
};
use crate::state::SharedState;

/// Error type for pipeline construction.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Builds the request pipeline from the shared state.
pub struct PipelineBuilder<'a> {
    state: &'a Arc<SharedState>,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(state: &'a Arc<SharedState>) -> Self {
        Self { state }
    }

    /// Assemble the chain for the configured run mode.
    pub fn build(self) -> Result<Pipeline, BuildError> {
        let config = &self.state.config;

        let logging = LoggingStage::new(
            config.log_format,
            config.echo,
            self.state.request_log.clone(),
        );
        let delay = DelayStage::new(Duration::from_millis(config.delay_ms));

        let mut stages: Vec<Arc<dyn Stage>> = Vec::new();
        match &config.upstream {
            Some(upstream) => {
                if config.failure.enabled {
                    stages.push(Arc::new(FailureStage::new(self.state.simulator.clone(), true)));
                }
                stages.push(Arc::new(logging));
                stages.push(Arc::new(delay));
                stages.push(Arc::new(ProxyStage::new(
                    upstream.clone(),
                    config.insecure_upstream_tls,
                )?));
            }
            None => {
                stages.push(Arc::new(ContentTypeStage::new(config.log_format)));
                if config.failure.enabled {
                    stages.push(Arc::new(FailureStage::new(self.state.simulator.clone(), false)));
                } else {
                    stages.push(Arc::new(StatusStage::new(config.status())));
                }
                stages.push(Arc::new(logging));
                stages.push(Arc::new(delay));
            }
        }

        let pipeline = Pipeline::new(stages);
        tracing::info!(stages = ?pipeline.stage_names(), "Pipeline assembled");
        Ok(pipeline)
    }
}
