//! Configuration module

use std::env;
use std::path::PathBuf;

use prediction_core::logic::model::DEFAULT_MAX_BATCH_SIZE;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Path to the ONNX model artifact
    pub model_path: PathBuf,

    /// Max records per batch request
    pub max_batch_size: usize,

    /// Max request body size in bytes
    pub max_body_bytes: usize,

    /// Environment (development, production)
    pub environment: String,

    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: PathBuf::from("lgb_model.onnx"),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_body_bytes: 8 * 1024 * 1024,
            environment: "development".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            max_batch_size: env::var("MAX_BATCH_SIZE")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_batch_size),

            max_body_bytes: env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_body_bytes),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),

            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => defaults.log_format,
            },
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
