//! Features Module - Input Records & Feature Encoding
//!
//! Wire record → validated request → feature vector.
//! Column order lives in `layout` and nowhere else.

pub mod layout;
pub mod record;
pub mod validation;
pub mod vector;


// Re-export common types
pub use layout::{LayoutInfo, LayoutMismatchError, FEATURE_COLUMNS, FEATURE_COUNT};
pub use record::{Flag, PredictionRequest, RawRecord, VehicleAge};
pub use validation::{validate, ValidationError};
pub use vector::{encode, encode_batch, FeatureVector};
