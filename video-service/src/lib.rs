//! HTTP service for educational video generation.
//!
//! Requests are validated here and forwarded to an external pipeline
//! orchestrator; finished videos are served back from the output directory.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{AppState, Application};
