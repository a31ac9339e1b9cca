//! Mock orchestrator for local development.
//!
//! Writes a placeholder file instead of rendering, so the generate/fetch
//! round trip works without the real pipeline.

use super::{OrchestratorError, PipelineOrchestrator, PipelineOutput};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Size of the placeholder "video".
const PLACEHOLDER_BYTES: usize = 4096;

pub struct MockOrchestrator {
    enabled: bool,
    output_dir: PathBuf,
}

impl MockOrchestrator {
    pub fn new(enabled: bool, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            enabled,
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl PipelineOrchestrator for MockOrchestrator {
    async fn process_query(
        &self,
        query: &str,
        sector: &str,
    ) -> Result<PipelineOutput, OrchestratorError> {
        if !self.enabled {
            return Err(OrchestratorError::Failed(
                "Mock orchestrator not enabled".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;

        let file_id = Uuid::new_v4();
        let path = self.output_dir.join(format!("{}.mp4", file_id));
        tokio::fs::write(&path, vec![0u8; PLACEHOLDER_BYTES])
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            sector = %sector,
            "Mock orchestrator wrote placeholder video"
        );

        let mut metadata = HashMap::new();
        metadata.insert("orchestrator".to_string(), json!("mock"));
        metadata.insert("file_id".to_string(), json!(file_id.to_string()));
        metadata.insert("size_bytes".to_string(), json!(PLACEHOLDER_BYTES));

        Ok(PipelineOutput {
            query: query.to_string(),
            sector: sector.to_string(),
            video_path: path.to_string_lossy().into_owned(),
            metadata,
        })
    }

    async fn health_check(&self) -> Result<(), OrchestratorError> {
        if self.enabled {
            Ok(())
        } else {
            Err(OrchestratorError::Failed(
                "Mock orchestrator not enabled".to_string(),
            ))
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
