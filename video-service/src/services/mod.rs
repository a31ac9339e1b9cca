pub mod metrics;
pub mod orchestrator;
pub mod video_store;

pub use metrics::{get_metrics, init_metrics};
pub use orchestrator::{
    MockOrchestrator, OrchestratorError, PipelineOrchestrator, PipelineOutput, PipelineResult,
    RemoteOrchestrator,
};
pub use video_store::{VideoRecord, VideoStore};
