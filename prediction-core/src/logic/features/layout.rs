//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema the model was trained on**
//!
//! ## Rules (NEVER break these):
//! 1. Add column → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Rename column → increment FEATURE_VERSION
//!
//! The serialized model consumes columns by position, so a silent reorder
//! produces wrong predictions without any error.

use std::sync::OnceLock;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// One model input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureColumn {
    /// Column name in the training dataframe
    pub name: &'static str,
    /// Field name on the wire (JSON request body)
    pub field: &'static str,
}

/// Total number of features
pub const FEATURE_COUNT: usize = 9;

/// Columns in exact order they appear in the vector
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_COLUMNS: [FeatureColumn; FEATURE_COUNT] = [
    FeatureColumn { name: "Age", field: "Age" },                                     // 0
    FeatureColumn { name: "Driving_License", field: "Driving_License" },             // 1
    FeatureColumn { name: "Previously_Insured", field: "Previously_Insured" },       // 2
    FeatureColumn { name: "Annual_Premium", field: "Annual_Premium" },               // 3
    FeatureColumn { name: "Gender_Male", field: "Gender_Male" },                     // 4
    FeatureColumn { name: "Vehicle_Damage_Yes", field: "Vehicle_Damage_Yes" },       // 5
    FeatureColumn { name: "Vehicle_Age_1-2 Year", field: "Vehicle_Age_1_2_Year" },   // 6
    FeatureColumn { name: "Vehicle_Age_< 1 Year", field: "Vehicle_Age_lt_1_Year" },  // 7
    FeatureColumn { name: "Vehicle_Age_> 2 Years", field: "Vehicle_Age_gt_2_Years" }, // 8
];

// Column indices used by the encoder
pub const IDX_AGE: usize = 0;
pub const IDX_DRIVING_LICENSE: usize = 1;
pub const IDX_PREVIOUSLY_INSURED: usize = 2;
pub const IDX_ANNUAL_PREMIUM: usize = 3;
pub const IDX_GENDER_MALE: usize = 4;
pub const IDX_VEHICLE_DAMAGE: usize = 5;
pub const IDX_VEHICLE_AGE_1_2: usize = 6;
pub const IDX_VEHICLE_AGE_LT_1: usize = 7;
pub const IDX_VEHICLE_AGE_GT_2: usize = 8;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
/// Used to detect layout mismatches at runtime
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for column in &FEATURE_COLUMNS {
        hasher.update(column.name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Layout hash, computed once
pub fn layout_hash() -> u32 {
    static HASH: OnceLock<u32> = OnceLock::new();
    *HASH.get_or_init(compute_layout_hash)
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_COLUMNS.iter().map(|c| c.name.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when the model's declared columns don't match the layout
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutMismatchError {
    #[error("Feature layout mismatch: model declares {actual} features, layout v{version} has {expected}")]
    Count {
        version: u8,
        expected: usize,
        actual: usize,
    },

    #[error("Feature layout mismatch at column {index}: expected '{expected}', model declares '{actual}'")]
    Column {
        index: usize,
        expected: &'static str,
        actual: String,
    },
}

/// Validate feature names declared by a model artifact against the layout.
///
/// Each declared name may use either the training column name or the wire
/// field name; anything else, or a different column count, is a mismatch.
pub fn validate_feature_names<S: AsRef<str>>(declared: &[S]) -> Result<(), LayoutMismatchError> {
    if declared.len() != FEATURE_COUNT {
        return Err(LayoutMismatchError::Count {
            version: FEATURE_VERSION,
            expected: FEATURE_COUNT,
            actual: declared.len(),
        });
    }

    for (index, (column, name)) in FEATURE_COLUMNS.iter().zip(declared).enumerate() {
        let name = name.as_ref().trim();
        if name != column.name && name != column.field {
            return Err(LayoutMismatchError::Column {
                index,
                expected: column.name,
                actual: name.to_string(),
            });
        }
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by training name or wire field name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_COLUMNS
        .iter()
        .position(|c| c.name == name || c.field == name)
}

/// Get training column name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_COLUMNS.get(index).map(|c| c.name)
}

// ============================================================================
// TESTS
// ============================================================================
