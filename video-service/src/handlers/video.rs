use crate::models::{VideoRequest, VideoResponse, VideoStatus};
use crate::services::metrics::{record_generation, record_retrieval};
use crate::services::OrchestratorError;
use crate::startup::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;
use service_core::extract::ValidatedJson;
use std::time::Instant;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Generate an educational video for a concept query.
#[tracing::instrument(skip(state, request))]
pub async fn generate_video(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VideoRequest>,
) -> Result<Json<VideoResponse>, AppError> {
    let orchestrator = state.orchestrator.name();
    let started = Instant::now();
    let outcome = state
        .orchestrator
        .process_query(&request.query, &request.sector)
        .await;
    let elapsed = started.elapsed();

    let output = match outcome {
        Ok(output) => output,
        Err(OrchestratorError::Failed(message)) => {
            record_generation(orchestrator, "failed", elapsed);
            tracing::warn!(
                error = %message,
                elapsed_ms = elapsed.as_millis() as u64,
                "Orchestrator reported failure"
            );
            return Err(AppError::PipelineFailed(message));
        }
        Err(OrchestratorError::Internal(err)) => {
            record_generation(orchestrator, "error", elapsed);
            return Err(AppError::InternalError(
                err.context("Video generation aborted"),
            ));
        }
    };

    record_generation(orchestrator, "completed", elapsed);

    let video_id = Uuid::new_v4().to_string();
    state.store.register(&video_id, &output.video_path);

    tracing::info!(
        video_id = %video_id,
        sector = %output.sector,
        video_path = %output.video_path,
        elapsed_ms = elapsed.as_millis() as u64,
        "Video generation completed"
    );

    Ok(Json(VideoResponse {
        video_id,
        query: output.query,
        sector: output.sector,
        video_path: output.video_path,
        metadata: output.metadata,
        status: VideoStatus::Completed,
    }))
}

/// Stream a generated video by id.
#[tracing::instrument(skip(state))]
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Response, AppError> {
    let Some(path) = state.store.locate(&video_id).await else {
        record_retrieval(false);
        return Err(video_not_found());
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        // Removed between lookup and open.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            record_retrieval(false);
            return Err(video_not_found());
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to open video");
            return Err(AppError::from(e));
        }
    };
    let size = file.metadata().await?.len();

    record_retrieval(true);
    tracing::info!(path = %path.display(), size = size, "Serving video");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, VIDEO_CONTENT_TYPE.to_string()),
            (header::CONTENT_LENGTH, size.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.mp4\"", video_id),
            ),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

fn video_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Video not found"))
}
