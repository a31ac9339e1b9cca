use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Default orchestrator request timeout. Rendering a video takes minutes.
const DEFAULT_ORCHESTRATOR_TIMEOUT_SECS: u64 = 600;

/// Default number of `video_id -> path` entries kept in memory.
const DEFAULT_CATALOG_CAPACITY: usize = 10_000;

#[derive(Clone)]
pub struct VideoConfig {
    pub common: core_config::Config,
    pub orchestrator: OrchestratorConfig,
    pub storage: StorageConfig,
    pub cors: CorsConfig,
}

#[derive(Clone)]
pub struct OrchestratorConfig {
    pub backend: OrchestratorBackend,
    /// Base URL of the remote pipeline orchestrator.
    pub url: String,
    /// Optional bearer token for the orchestrator.
    pub api_key: Option<Secret<String>>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorBackend {
    Remote,
    Mock,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding rendered `<id>.mp4` files.
    pub output_dir: String,
    pub catalog_capacity: usize,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// `["*"]` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl VideoConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(VideoConfig {
            common: common_config,
            orchestrator: OrchestratorConfig {
                backend: get_env("ORCHESTRATOR_BACKEND", Some("remote"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                url: get_env(
                    "ORCHESTRATOR_URL",
                    Some("http://pipeline-orchestrator:8000"),
                    is_prod,
                )?,
                api_key: env::var("ORCHESTRATOR_API_KEY")
                    .ok()
                    .filter(|key| !key.is_empty())
                    .map(Secret::new),
                timeout_secs: parse_positive(
                    "ORCHESTRATOR_TIMEOUT_SECS",
                    &get_env(
                        "ORCHESTRATOR_TIMEOUT_SECS",
                        Some(&DEFAULT_ORCHESTRATOR_TIMEOUT_SECS.to_string()),
                        is_prod,
                    )?,
                )?,
            },
            storage: StorageConfig {
                output_dir: get_env("VIDEO_OUTPUT_DIR", Some("output"), is_prod)?,
                catalog_capacity: parse_positive(
                    "VIDEO_CATALOG_CAPACITY",
                    &get_env(
                        "VIDEO_CATALOG_CAPACITY",
                        Some(&DEFAULT_CATALOG_CAPACITY.to_string()),
                        is_prod,
                    )?,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&get_env(
                    "CORS_ALLOWED_ORIGINS",
                    Some("*"),
                    is_prod,
                )?),
            },
        })
    }
}

impl std::str::FromStr for OrchestratorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" => Ok(OrchestratorBackend::Remote),
            "mock" => Ok(OrchestratorBackend::Mock),
            _ => Err(format!("Invalid orchestrator backend: {}", s)),
        }
    }
}

/// Parse a strictly positive number. Zero would disable the setting it sizes.
fn parse_positive<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr + Default + PartialOrd,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be a positive number, got '{}'",
            key,
            raw
        ))),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
