//! HTTP client for a remote pipeline orchestrator.
//!
//! `POST {base_url}/process` with `{"query", "sector"}` answered by a
//! [`PipelineResult`]; `GET {base_url}/health` for readiness.

use super::{OrchestratorError, PipelineOrchestrator, PipelineOutput, PipelineResult};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use service_core::observability::TracedRequestExt;
use std::time::Duration;

/// Remote orchestrator configuration.
#[derive(Clone)]
pub struct RemoteOrchestratorConfig {
    pub base_url: String,
    pub api_key: Option<Secret<String>>,
    pub timeout: Duration,
}

pub struct RemoteOrchestrator {
    config: RemoteOrchestratorConfig,
    client: Client,
}

#[derive(Serialize)]
struct ProcessRequest<'a> {
    query: &'a str,
    sector: &'a str,
}

impl RemoteOrchestrator {
    pub fn new(config: RemoteOrchestratorConfig) -> Result<Self, OrchestratorError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }
}

#[async_trait]
impl PipelineOrchestrator for RemoteOrchestrator {
    #[tracing::instrument(skip(self, query), fields(query_len = query.len()))]
    async fn process_query(
        &self,
        query: &str,
        sector: &str,
    ) -> Result<PipelineOutput, OrchestratorError> {
        let response = self
            .authorize(self.client.post(self.url("process")))
            .json(&ProcessRequest { query, sector })
            .with_trace_context()
            .send()
            .await
            .context("Failed to reach pipeline orchestrator")?;

        let status = response.status();

        // The orchestrator reports business failures inside the body, so an
        // error status with a parseable result is still honoured.
        let body = response
            .text()
            .await
            .context("Failed to read orchestrator response")?;

        match serde_json::from_str::<PipelineResult>(&body) {
            Ok(result) => {
                if !status.is_success() && result.success {
                    return Err(OrchestratorError::Internal(anyhow::anyhow!(
                        "orchestrator returned {} with a success body",
                        status
                    )));
                }
                tracing::debug!(
                    status = %status,
                    success = result.success,
                    "Orchestrator responded"
                );
                result.into_output(query, sector)
            }
            Err(e) => {
                tracing::warn!(
                    status = %status,
                    body_len = body.len(),
                    error = %e,
                    "Unparseable orchestrator response"
                );
                Err(OrchestratorError::Internal(anyhow::anyhow!(
                    "orchestrator returned {} with an unparseable body: {}",
                    status,
                    e
                )))
            }
        }
    }

    async fn health_check(&self) -> Result<(), OrchestratorError> {
        let response = self
            .authorize(self.client.get(self.url("health")))
            .timeout(Duration::from_secs(5))
            .with_trace_context()
            .send()
            .await
            .context("Failed to reach pipeline orchestrator")?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(OrchestratorError::Internal(anyhow::anyhow!(
                "orchestrator health returned {}",
                status
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
