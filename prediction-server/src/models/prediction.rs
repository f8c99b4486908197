//! Batch request/response bodies

use prediction_core::RawRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchPredictRequest {
    pub data: Vec<RawRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchPredictResponse {
    pub predictions: Vec<u8>,
}
