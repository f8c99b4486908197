//! Prediction Service - validation, encoding and model dispatch
//!
//! Owns the loaded classifier (or the reason it isn't loaded) and the
//! request-id counter. Constructed once at startup and shared via `Arc`.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::logic::features::{
    encode, encode_batch, layout, validate, FeatureVector, LayoutInfo, PredictionRequest,
    RawRecord, ValidationError,
};
use super::inference::{Classifier, InferenceError, ModelMetadata, OnnxClassifier};
use super::stats::{InferenceStats, StatsSnapshot};

/// Default upper bound on records per batch call
pub const DEFAULT_MAX_BATCH_SIZE: usize = 10_000;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERROR")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionLabel {
    #[serde(rename = "will buy")]
    WillBuy,
    #[serde(rename = "will not buy")]
    WillNotBuy,
}

impl PredictionLabel {
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            PredictionLabel::WillBuy
        } else {
            PredictionLabel::WillNotBuy
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PredictionLabel::WillBuy => "will buy",
            PredictionLabel::WillNotBuy => "will not buy",
        }
    }
}

/// Single-record prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: PredictionLabel,
    pub numeric_class: u8,
    pub request_id: u64,
}

/// Engine status for the model status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub status: HealthStatus,
    pub reason: Option<String>,
    pub model: Option<ModelMetadata>,
    pub layout: LayoutInfo,
    pub stats: StatsSnapshot,
    pub requests_served: u64,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Record {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("Batch of {size} records exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("Model not loaded: {0}")]
    ModelUnavailable(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

// ============================================================================
// SERVICE
// ============================================================================

enum ModelState {
    Ready(Arc<dyn Classifier>),
    Unavailable { reason: String },
}

pub struct PredictionService {
    model: ModelState,
    max_batch_size: usize,
    last_request_id: AtomicU64,
    stats: InferenceStats,
}

impl PredictionService {
    /// Wrap a loaded classifier, checking its declared columns against the
    /// feature layout. A mismatch leaves the service degraded.
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        let schema_check = classifier
            .metadata()
            .feature_names
            .as_deref()
            .map(|names| layout::validate_feature_names(names));

        let model = match schema_check {
            Some(Err(e)) => {
                log::error!("Rejecting model {}: {}", classifier.metadata().source, e);
                ModelState::Unavailable { reason: e.to_string() }
            }
            _ => ModelState::Ready(classifier),
        };

        Self::with_state(model)
    }

    /// Service with no model; every prediction fails with `ModelUnavailable`
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::with_state(ModelState::Unavailable { reason: reason.into() })
    }

    /// Load the ONNX artifact at `path`. Never fails: a load error yields a
    /// degraded service.
    pub fn load(path: impl AsRef<Path>) -> Self {
        match OnnxClassifier::load(path) {
            Ok(classifier) => Self::new(Arc::new(classifier)),
            Err(e) => {
                log::error!("Model load failed: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    fn with_state(model: ModelState) -> Self {
        Self {
            model,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            last_request_id: AtomicU64::new(0),
            stats: InferenceStats::default(),
        }
    }

    pub fn with_max_batch_size(mut self, limit: usize) -> Self {
        self.max_batch_size = limit;
        self
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.model, ModelState::Ready(_))
    }

    pub fn health(&self) -> HealthStatus {
        if self.is_ready() { HealthStatus::Ok } else { HealthStatus::Error }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.model {
            ModelState::Ready(_) => None,
            ModelState::Unavailable { reason } => Some(reason),
        }
    }

    /// Number of successful single-record predictions so far
    pub fn requests_served(&self) -> u64 {
        self.last_request_id.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            status: self.health(),
            reason: self.unavailable_reason().map(str::to_string),
            model: match &self.model {
                ModelState::Ready(classifier) => Some(classifier.metadata().clone()),
                ModelState::Unavailable { .. } => None,
            },
            layout: LayoutInfo::current(),
            stats: self.stats.snapshot(),
            requests_served: self.requests_served(),
        }
    }

    /// Validate, encode and classify one record
    pub fn predict(&self, record: &RawRecord) -> Result<PredictionResult, PredictError> {
        let request = validate(record)?;
        let vector = encode(&request);
        log::debug!("Encoded features: {}", vector.to_log_entry());

        let classes = self.run_model(&[vector])?;
        let numeric_class = classes[0];

        let request_id = self.last_request_id.fetch_add(1, Ordering::Relaxed) + 1;

        Ok(PredictionResult {
            label: PredictionLabel::from_class(numeric_class),
            numeric_class,
            request_id,
        })
    }

    /// Validate every record, then classify them in one model call.
    /// Output order matches input order.
    pub fn predict_batch(&self, records: &[RawRecord]) -> Result<Vec<u8>, PredictError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        if records.len() > self.max_batch_size {
            return Err(PredictError::BatchTooLarge {
                size: records.len(),
                limit: self.max_batch_size,
            });
        }

        let requests = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                validate(record).map_err(|source| PredictError::InvalidRecord { index, source })
            })
            .collect::<Result<Vec<PredictionRequest>, _>>()?;

        self.run_model(&encode_batch(&requests))
    }

    fn run_model(&self, vectors: &[FeatureVector]) -> Result<Vec<u8>, PredictError> {
        let classifier = match &self.model {
            ModelState::Ready(classifier) => classifier,
            ModelState::Unavailable { reason } => {
                return Err(PredictError::ModelUnavailable(reason.clone()));
            }
        };

        let start = Instant::now();
        let result = classifier
            .predict(vectors)
            .and_then(|labels| check_labels(labels, vectors.len()));

        match result {
            Ok(classes) => {
                self.stats.record_success(start.elapsed(), vectors.len());
                Ok(classes)
            }
            Err(e) => {
                self.stats.record_failure();
                log::error!("Inference error on {} rows: {}", vectors.len(), e);
                Err(e.into())
            }
        }
    }
}

/// Labels must be one per row, each 0 or 1
fn check_labels(labels: Vec<i64>, rows: usize) -> Result<Vec<u8>, InferenceError> {
    if labels.len() != rows {
        return Err(InferenceError::Output(format!(
            "expected {} labels, model returned {}",
            rows,
            labels.len()
        )));
    }

    labels
        .into_iter()
        .map(|label| match label {
            0 => Ok(0),
            1 => Ok(1),
            other => Err(InferenceError::Output(format!("label {} is not a binary class", other))),
        })
        .collect()
}
