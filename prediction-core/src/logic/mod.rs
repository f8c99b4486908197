//! Logic Module - Business Logic & Engines
//!
//! - `features/` - Input records, validation, feature encoding
//! - `model/` - Inference (ONNX) and prediction dispatch

pub mod features;
pub mod model;
