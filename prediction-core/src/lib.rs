//! Prediction Core - vehicle insurance purchase classifier
//!
//! Input validation, feature encoding and model dispatch shared by the
//! HTTP service and the form client.

pub mod logic;

pub use logic::features::{
    encode, validate, FeatureVector, Flag, PredictionRequest, RawRecord, ValidationError,
    VehicleAge,
};
pub use logic::model::{
    Classifier, EngineStatus, HealthStatus, InferenceError, ModelMetadata, PredictError,
    PredictionLabel, PredictionResult, PredictionService,
};
