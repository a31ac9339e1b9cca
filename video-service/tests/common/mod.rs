#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use video_service::config::{
    CorsConfig, OrchestratorBackend, OrchestratorConfig, StorageConfig, VideoConfig,
};
use video_service::services::{OrchestratorError, PipelineOrchestrator, PipelineOutput};
use video_service::startup::Application;

/// What the stub orchestrator answers with.
#[derive(Clone)]
pub enum StubBehavior {
    Succeed {
        video_path: String,
        metadata: HashMap<String, Value>,
    },
    Fail(String),
    Fault(String),
}

pub struct StubOrchestrator {
    behavior: StubBehavior,
    pub calls: AtomicUsize,
}

impl StubOrchestrator {
    pub fn new(behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn succeeding(video_path: &str) -> Arc<Self> {
        Self::new(StubBehavior::Succeed {
            video_path: video_path.to_string(),
            metadata: HashMap::new(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PipelineOrchestrator for StubOrchestrator {
    async fn process_query(
        &self,
        query: &str,
        sector: &str,
    ) -> Result<PipelineOutput, OrchestratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            StubBehavior::Succeed {
                video_path,
                metadata,
            } => Ok(PipelineOutput {
                query: query.to_string(),
                sector: sector.to_string(),
                video_path: video_path.clone(),
                metadata: metadata.clone(),
            }),
            StubBehavior::Fail(message) => Err(OrchestratorError::Failed(message.clone())),
            StubBehavior::Fault(message) => {
                Err(OrchestratorError::Internal(anyhow::anyhow!(message.clone())))
            }
        }
    }

    async fn health_check(&self) -> Result<(), OrchestratorError> {
        match &self.behavior {
            StubBehavior::Fault(message) => {
                Err(OrchestratorError::Internal(anyhow::anyhow!(message.clone())))
            }
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Scratch directory for one test, removed when dropped.
pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create scratch dir")
}

/// Where a test app under `scratch` keeps its videos.
pub fn output_dir_in(scratch: &TempDir) -> PathBuf {
    scratch.path().join("output")
}

pub fn test_config(output_dir: &Path) -> VideoConfig {
    VideoConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            ..CoreConfig::default()
        },
        orchestrator: OrchestratorConfig {
            backend: OrchestratorBackend::Mock,
            url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            timeout_secs: 5,
        },
        storage: StorageConfig {
            output_dir: output_dir.to_string_lossy().into_owned(),
            catalog_capacity: 100,
        },
        cors: CorsConfig {
            allowed_origins: vec!["*".to_string()],
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub output_dir: PathBuf,
    pub client: reqwest::Client,
    /// Holds the output dir alive for the life of the app.
    scratch: TempDir,
}

impl TestApp {
    /// Spawn the service with the given orchestrator and a fresh output dir.
    pub async fn spawn(orchestrator: Arc<dyn PipelineOrchestrator>) -> Self {
        Self::spawn_in(scratch_dir(), orchestrator).await
    }

    /// Spawn the service serving videos from `output_dir_in(&scratch)`.
    pub async fn spawn_in(scratch: TempDir, orchestrator: Arc<dyn PipelineOrchestrator>) -> Self {
        let output_dir = output_dir_in(&scratch);
        tokio::fs::create_dir_all(&output_dir)
            .await
            .expect("Failed to create output dir");

        let app = Application::build_with_orchestrator(test_config(&output_dir), orchestrator)
            .await
            .expect("Failed to build test application");

        Self::start(app, scratch, output_dir).await
    }

    /// Spawn the service with the orchestrator chosen by `config`.
    ///
    /// `config` should point its output dir inside `scratch`.
    pub async fn spawn_with_config(scratch: TempDir, config: VideoConfig) -> Self {
        let output_dir = PathBuf::from(&config.storage.output_dir);
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        Self::start(app, scratch, output_dir).await
    }

    async fn start(app: Application, scratch: TempDir, output_dir: PathBuf) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            output_dir,
            client,
            scratch,
        }
    }

    /// Root of this app's scratch space; the output dir is a child of it.
    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    pub async fn generate(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/generate-video", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn fetch_video(&self, video_id: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/video/{}", self.address, video_id))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Write a fake rendered video into the output dir.
    pub async fn write_video(&self, file_name: &str, data: &[u8]) -> PathBuf {
        let path = self.output_dir.join(file_name);
        tokio::fs::write(&path, data)
            .await
            .expect("Failed to write video");
        path
    }
}
