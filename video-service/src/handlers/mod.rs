//! HTTP handlers for the video service.

pub mod health;
pub mod video;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use video::{generate_video, get_video};
