//! Application startup and lifecycle management.

use crate::config::{CorsConfig, OrchestratorBackend, VideoConfig};
use crate::handlers;
use crate::services::orchestrator::remote::RemoteOrchestratorConfig;
use crate::services::{MockOrchestrator, PipelineOrchestrator, RemoteOrchestrator, VideoStore};
use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{make_request_span, metrics_middleware, request_id_middleware};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: VideoConfig,
    pub orchestrator: Arc<dyn PipelineOrchestrator>,
    pub store: Arc<VideoStore>,
}

/// Build the orchestrator selected by configuration.
pub fn build_orchestrator(config: &VideoConfig) -> Result<Arc<dyn PipelineOrchestrator>, AppError> {
    let orchestrator: Arc<dyn PipelineOrchestrator> = match config.orchestrator.backend {
        OrchestratorBackend::Remote => {
            let remote = RemoteOrchestrator::new(RemoteOrchestratorConfig {
                base_url: config.orchestrator.url.clone(),
                api_key: config.orchestrator.api_key.clone(),
                timeout: Duration::from_secs(config.orchestrator.timeout_secs),
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

            tracing::info!(
                endpoint = %config.orchestrator.url,
                timeout_secs = config.orchestrator.timeout_secs,
                "Initialized remote pipeline orchestrator"
            );
            Arc::new(remote)
        }
        OrchestratorBackend::Mock => {
            tracing::info!(
                output_dir = %config.storage.output_dir,
                "Using mock pipeline orchestrator"
            );
            Arc::new(MockOrchestrator::new(true, &config.storage.output_dir))
        }
    };

    Ok(orchestrator)
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    if cors.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                None
            }
        })
        .collect();

    // Credentials cannot be combined with wildcards, so methods and headers
    // mirror the request instead.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/generate-video", post(handlers::generate_video))
        .route("/video/:video_id", get(handlers::get_video))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        // route_layer so the matched route template is visible to the labels
        .route_layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .layer(cors_layer(&state.config.cors))
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    /// Build the application with the orchestrator named in `config`.
    pub async fn build(config: VideoConfig) -> Result<Self, AppError> {
        let orchestrator = build_orchestrator(&config)?;
        Self::build_with_orchestrator(config, orchestrator).await
    }

    /// Build the application around an already constructed orchestrator.
    pub async fn build_with_orchestrator(
        config: VideoConfig,
        orchestrator: Arc<dyn PipelineOrchestrator>,
    ) -> Result<Self, AppError> {
        let store = Arc::new(VideoStore::new(
            &config.storage.output_dir,
            config.storage.catalog_capacity,
        ));

        let state = AppState {
            config: config.clone(),
            orchestrator,
            store,
        };

        let app = build_router(state.clone());

        // Port 0 picks a random port (tests)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port = port,
            orchestrator = state.orchestrator.name(),
            output_dir = %config.storage.output_dir,
            "Video service listening"
        );

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn store(&self) -> &Arc<VideoStore> {
        &self.state.store
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
