//! Feature Vector - Core data structure for ML input
//!
//! Uses the centralized layout from `layout.rs`; `encode` is the only place
//! a request becomes model input.

use serde::{Deserialize, Serialize};

use super::layout::{
    self, FEATURE_COLUMNS, FEATURE_COUNT, IDX_AGE, IDX_ANNUAL_PREMIUM, IDX_DRIVING_LICENSE,
    IDX_GENDER_MALE, IDX_PREVIOUSLY_INSURED, IDX_VEHICLE_AGE_1_2, IDX_VEHICLE_AGE_GT_2,
    IDX_VEHICLE_AGE_LT_1, IDX_VEHICLE_DAMAGE,
};
use super::record::{PredictionRequest, VehicleAge};

/// Feature values in the order defined by `FEATURE_COLUMNS`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Get feature by training column or wire field name
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "layout_hash": layout::layout_hash(),
            "named_values": FEATURE_COLUMNS.iter()
                .zip(self.values.iter())
                .map(|(c, v)| (c.name.to_string(), serde_json::json!(v)))
                .collect::<serde_json::Map<String, serde_json::Value>>(),
        })
    }
}

fn indicator(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

/// Encode a validated request in training column order
pub fn encode(request: &PredictionRequest) -> FeatureVector {
    let mut values = [0.0f32; FEATURE_COUNT];

    values[IDX_AGE] = f32::from(request.age);
    values[IDX_DRIVING_LICENSE] = indicator(request.has_driving_license);
    values[IDX_PREVIOUSLY_INSURED] = indicator(request.previously_insured);
    values[IDX_ANNUAL_PREMIUM] = request.annual_premium as f32;
    values[IDX_GENDER_MALE] = indicator(request.is_male);
    values[IDX_VEHICLE_DAMAGE] = indicator(request.vehicle_damaged);
    values[IDX_VEHICLE_AGE_1_2] = indicator(request.vehicle_age == VehicleAge::OneToTwoYears);
    values[IDX_VEHICLE_AGE_LT_1] = indicator(request.vehicle_age == VehicleAge::UnderOneYear);
    values[IDX_VEHICLE_AGE_GT_2] = indicator(request.vehicle_age == VehicleAge::OverTwoYears);

    FeatureVector::from_values(values)
}

/// Encode a batch, preserving order
pub fn encode_batch(requests: &[PredictionRequest]) -> Vec<FeatureVector> {
    requests.iter().map(encode).collect()
}
