//! Input validation
//!
//! Turns a `RawRecord` into a `PredictionRequest` or explains why it can't.
//! Runs before any feature is encoded; no side effects.

use super::record::{Flag, PredictionRequest, RawRecord, VehicleAge};

pub const MIN_AGE: f64 = 18.0;
pub const MAX_AGE: f64 = 100.0;

/// Largest premium that still encodes to a finite `f32`
pub const MAX_PREMIUM: f64 = f32::MAX as f64;

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("Age must be between 18 and 100, got {age}")]
    AgeOutOfRange { age: f64 },

    #[error("Age must be a whole number, got {age}")]
    AgeNotWhole { age: f64 },

    #[error("Annual_Premium must be non-negative, got {premium}")]
    NegativePremium { premium: f64 },

    #[error("Annual_Premium must be at most {max:e}, got {premium}")]
    PremiumTooLarge { premium: f64, max: f64 },

    #[error("{field} must be true/false or 0/1, got {value}")]
    InvalidFlag { field: &'static str, value: f64 },

    #[error("Select exactly one Vehicle Age ({selected} selected)")]
    VehicleAge { selected: usize },
}

impl ValidationError {
    /// Wire name of the offending field (`None` for the vehicle-age triple)
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::NotFinite { field } => Some(field),
            ValidationError::AgeOutOfRange { .. } | ValidationError::AgeNotWhole { .. } => Some("Age"),
            ValidationError::NegativePremium { .. } | ValidationError::PremiumTooLarge { .. } => {
                Some("Annual_Premium")
            }
            ValidationError::InvalidFlag { field, .. } => Some(field),
            ValidationError::VehicleAge { .. } => None,
        }
    }
}

fn flag(field: &'static str, value: Flag) -> Result<bool, ValidationError> {
    match value {
        Flag::Bool(b) => Ok(b),
        Flag::Number(n) => value
            .as_bool()
            .ok_or(ValidationError::InvalidFlag { field, value: n }),
    }
}

fn validate_age(age: f64) -> Result<u8, ValidationError> {
    if !age.is_finite() {
        return Err(ValidationError::NotFinite { field: "Age" });
    }
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ValidationError::AgeOutOfRange { age });
    }
    if age.fract() != 0.0 {
        return Err(ValidationError::AgeNotWhole { age });
    }
    Ok(age as u8)
}

fn validate_premium(premium: f64) -> Result<f64, ValidationError> {
    if !premium.is_finite() {
        return Err(ValidationError::NotFinite { field: "Annual_Premium" });
    }
    if premium < 0.0 {
        return Err(ValidationError::NegativePremium { premium });
    }
    if premium > MAX_PREMIUM {
        return Err(ValidationError::PremiumTooLarge { premium, max: MAX_PREMIUM });
    }
    Ok(premium)
}

fn validate_vehicle_age(record: &RawRecord) -> Result<VehicleAge, ValidationError> {
    let one_to_two = flag("Vehicle_Age_1_2_Year", record.vehicle_age_1_2)?;
    let under_one = flag("Vehicle_Age_lt_1_Year", record.vehicle_age_lt_1)?;
    let over_two = flag("Vehicle_Age_gt_2_Years", record.vehicle_age_gt_2)?;

    match (one_to_two, under_one, over_two) {
        (true, false, false) => Ok(VehicleAge::OneToTwoYears),
        (false, true, false) => Ok(VehicleAge::UnderOneYear),
        (false, false, true) => Ok(VehicleAge::OverTwoYears),
        _ => Err(ValidationError::VehicleAge {
            selected: [one_to_two, under_one, over_two].iter().filter(|&&b| b).count(),
        }),
    }
}

/// Validate a wire record.
///
/// Field checks run in column order, then the vehicle-age triple; the first
/// failure is returned.
pub fn validate(record: &RawRecord) -> Result<PredictionRequest, ValidationError> {
    Ok(PredictionRequest {
        age: validate_age(record.age)?,
        has_driving_license: flag("Driving_License", record.driving_license)?,
        previously_insured: flag("Previously_Insured", record.previously_insured)?,
        annual_premium: validate_premium(record.annual_premium)?,
        is_male: flag("Gender_Male", record.gender_male)?,
        vehicle_damaged: flag("Vehicle_Damage_Yes", record.vehicle_damage)?,
        vehicle_age: validate_vehicle_age(record)?,
    })
}
