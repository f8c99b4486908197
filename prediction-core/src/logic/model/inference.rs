//! Inference Engine - ONNX Runtime Integration
//!
//! Loads the exported classifier and runs it on feature batches.
//! The `Classifier` trait keeps the service independent of the runtime.

use std::path::Path;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::features::{FeatureVector, FEATURE_COUNT};

/// Custom metadata key holding the training column names
pub const FEATURE_NAMES_KEY: &str = "feature_names";

/// Output carrying predicted class labels in sklearn/LightGBM ONNX exports
pub const LABEL_OUTPUT: &str = "label";

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub source: String,
    pub engine: String,
    /// SHA-256 of the artifact bytes
    pub checksum: Option<String>,
    /// Column names declared by the artifact, if any
    pub feature_names: Option<Vec<String>>,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("Failed to load model: {0}")]
    Load(String),

    #[error("Inference failed: {0}")]
    Runtime(String),

    #[error("Unexpected model output: {0}")]
    Output(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// A loaded, immutable binary classifier.
///
/// `predict` returns one raw class label per input row, in input order.
pub trait Classifier: Send + Sync {
    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<i64>, InferenceError>;

    fn metadata(&self) -> &ModelMetadata;
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// Classifier backed by an ONNX Runtime session
pub struct OnnxClassifier {
    // `Session::run` takes `&mut self`
    session: Mutex<Session>,
    label_output: String,
    metadata: ModelMetadata,
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let model_path = model_path.as_ref();
        log::info!("Loading ONNX model from: {}", model_path.display());

        let bytes = std::fs::read(model_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => InferenceError::NotFound(model_path.display().to_string()),
            _ => InferenceError::Load(format!("{}: {}", model_path.display(), e)),
        })?;

        Self::from_bytes(&bytes, model_path.display().to_string())
    }

    /// Load ONNX model from bytes
    pub fn from_bytes(model_bytes: &[u8], source: String) -> Result<Self, InferenceError> {
        log::debug!("Building ONNX session ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| InferenceError::Load(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Load(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| InferenceError::Load(format!("{}: {}", source, e)))?;

        if session.inputs.len() != 1 {
            return Err(InferenceError::Load(format!(
                "expected a single input tensor, model declares {}",
                session.inputs.len()
            )));
        }

        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name == LABEL_OUTPUT)
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::Load("No output defined".to_string()))?;

        let feature_names = read_feature_names(&session)?;
        match &feature_names {
            Some(names) => log::info!("Model declares {} feature names", names.len()),
            None => log::warn!(
                "Model carries no '{}' metadata; trusting the built-in feature layout",
                FEATURE_NAMES_KEY
            ),
        }

        let metadata = ModelMetadata {
            source,
            engine: "onnx".to_string(),
            checksum: Some(hex::encode(Sha256::digest(model_bytes))),
            feature_names,
            loaded_at: Utc::now(),
        };

        log::info!("ONNX model loaded successfully (output '{}')", label_output);

        Ok(Self {
            session: Mutex::new(session),
            label_output,
            metadata,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<i64>, InferenceError> {
        let mut input_data = Vec::with_capacity(batch.len() * FEATURE_COUNT);
        for vector in batch {
            input_data.extend_from_slice(vector.as_slice());
        }

        let input_array = Array2::<f32>::from_shape_vec((batch.len(), FEATURE_COUNT), input_data)
            .map_err(|e| InferenceError::Runtime(format!("Array error: {}", e)))?;

        let input_tensor = Tensor::from_array(input_array)
            .map_err(|e| InferenceError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;

        let output = outputs
            .get(&self.label_output)
            .ok_or_else(|| InferenceError::Output(format!("missing output '{}'", self.label_output)))?;

        // Some exporters emit float labels
        let labels = match output.try_extract_tensor::<i64>() {
            Ok((_, data)) => data.to_vec(),
            Err(_) => {
                let (_, data) = output
                    .try_extract_tensor::<f32>()
                    .map_err(|e| InferenceError::Output(format!("Extract error: {}", e)))?;
                data.iter().map(|&v| float_label(v)).collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(labels)
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

fn float_label(value: f32) -> Result<i64, InferenceError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(InferenceError::Output(format!("non-integral class label {}", value)));
    }
    Ok(value as i64)
}

fn read_feature_names(session: &Session) -> Result<Option<Vec<String>>, InferenceError> {
    let metadata = session
        .metadata()
        .map_err(|e| InferenceError::Load(format!("Failed to read metadata: {}", e)))?;

    let raw = metadata
        .custom(FEATURE_NAMES_KEY)
        .map_err(|e| InferenceError::Load(format!("Failed to read '{}': {}", FEATURE_NAMES_KEY, e)))?;

    Ok(raw.map(|s| parse_feature_names(&s)))
}

/// Parse a `feature_names` entry: a JSON array, or a comma-separated list
pub fn parse_feature_names(raw: &str) -> Vec<String> {
    if let Ok(names) = serde_json::from_str::<Vec<String>>(raw) {
        return names;
    }

    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
