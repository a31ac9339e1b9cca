//! Pipeline orchestrator abstraction.
//!
//! The orchestrator turns a concept query into a rendered video. It lives
//! outside this service; this module defines the seam and the backends that
//! reach it.

pub mod mock;
pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

pub use mock::MockOrchestrator;
pub use remote::RemoteOrchestrator;

/// Message used when the orchestrator reports failure without saying why.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Video generation failed";

/// Outcome of an orchestration attempt that did not produce a video.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// The orchestrator ran and declined or failed the job. The message is
    /// intended for the caller.
    #[error("{0}")]
    Failed(String),

    /// Anything else: transport, protocol or local I/O faults.
    #[error("Orchestrator fault: {0}")]
    Internal(#[from] anyhow::Error),
}

/// A successfully rendered video.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub query: String,
    pub sector: String,
    pub video_path: String,
    pub metadata: HashMap<String, Value>,
}

/// Wire form of an orchestrator result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub success: bool,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PipelineResult {
    /// Split the success flag into a typed outcome.
    ///
    /// `query` and `sector` are the values that were sent; they stand in for
    /// an echo the orchestrator left out.
    pub fn into_output(
        self,
        query: &str,
        sector: &str,
    ) -> Result<PipelineOutput, OrchestratorError> {
        if !self.success {
            let message = self
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
            return Err(OrchestratorError::Failed(message));
        }

        let video_path = self
            .video_path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                OrchestratorError::Internal(anyhow::anyhow!(
                    "orchestrator reported success without a video_path"
                ))
            })?;

        Ok(PipelineOutput {
            query: non_empty_or(self.query, query),
            sector: non_empty_or(self.sector, sector),
            video_path,
            metadata: self.metadata,
        })
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Trait for pipeline orchestrator backends.
#[async_trait]
pub trait PipelineOrchestrator: Send + Sync {
    /// Render a video explaining `query` within `sector`.
    async fn process_query(
        &self,
        query: &str,
        sector: &str,
    ) -> Result<PipelineOutput, OrchestratorError>;

    /// Check whether the orchestrator can accept work.
    async fn health_check(&self) -> Result<(), OrchestratorError>;

    /// Short name for logs and metrics.
    fn name(&self) -> &'static str;
}
