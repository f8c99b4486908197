//! Model Module - Inference Engine & Prediction Service
//!
//! `inference` hides the runtime behind the `Classifier` trait;
//! `service` owns the loaded model and dispatches single/batch predictions.

pub mod inference;
pub mod service;
pub mod stats;

// Re-export common types
pub use inference::{Classifier, InferenceError, ModelMetadata, OnnxClassifier};
pub use service::{
    EngineStatus, HealthStatus, PredictError, PredictionLabel, PredictionResult,
    PredictionService, DEFAULT_MAX_BATCH_SIZE,
};
pub use stats::StatsSnapshot;
