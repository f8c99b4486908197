//! Input records - wire shape and validated shape
//!
//! `RawRecord` is what arrives in a request body. It only becomes a
//! `PredictionRequest` after passing `validation::validate`.

use serde::{Deserialize, Serialize};

/// Boolean indicator as sent by clients: `true`/`false` or `0`/`1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Number(f64),
}

impl Flag {
    /// Interpret the flag, `None` if it is a number other than 0 or 1
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Flag::Bool(b) => Some(b),
            Flag::Number(n) if n == 0.0 => Some(false),
            Flag::Number(n) if n == 1.0 => Some(true),
            Flag::Number(_) => None,
        }
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Flag::Bool(value)
    }
}

/// One record as received on the wire.
///
/// Field names follow the training dataframe; the descriptive names are
/// accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Age", alias = "age")]
    pub age: f64,

    #[serde(rename = "Driving_License", alias = "has_driving_license")]
    pub driving_license: Flag,

    #[serde(rename = "Previously_Insured", alias = "previously_insured")]
    pub previously_insured: Flag,

    #[serde(rename = "Annual_Premium", alias = "annual_premium")]
    pub annual_premium: f64,

    #[serde(rename = "Gender_Male", alias = "is_male")]
    pub gender_male: Flag,

    #[serde(rename = "Vehicle_Damage_Yes", alias = "vehicle_damaged")]
    pub vehicle_damage: Flag,

    #[serde(rename = "Vehicle_Age_1_2_Year", alias = "vehicle_age_1_to_2y")]
    pub vehicle_age_1_2: Flag,

    #[serde(rename = "Vehicle_Age_lt_1_Year", alias = "vehicle_age_under_1y")]
    pub vehicle_age_lt_1: Flag,

    #[serde(rename = "Vehicle_Age_gt_2_Years", alias = "vehicle_age_over_2y")]
    pub vehicle_age_gt_2: Flag,
}

/// Vehicle age bucket (the one-hot triple collapsed to one value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleAge {
    UnderOneYear,
    OneToTwoYears,
    OverTwoYears,
}

impl VehicleAge {
    pub fn label(self) -> &'static str {
        match self {
            VehicleAge::UnderOneYear => "< 1 year",
            VehicleAge::OneToTwoYears => "1-2 years",
            VehicleAge::OverTwoYears => "> 2 years",
        }
    }
}

/// Validated prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub age: u8,
    pub has_driving_license: bool,
    pub previously_insured: bool,
    pub annual_premium: f64,
    pub is_male: bool,
    pub vehicle_damaged: bool,
    pub vehicle_age: VehicleAge,
}

impl From<&PredictionRequest> for RawRecord {
    fn from(req: &PredictionRequest) -> Self {
        Self {
            age: f64::from(req.age),
            driving_license: req.has_driving_license.into(),
            previously_insured: req.previously_insured.into(),
            annual_premium: req.annual_premium,
            gender_male: req.is_male.into(),
            vehicle_damage: req.vehicle_damaged.into(),
            vehicle_age_1_2: (req.vehicle_age == VehicleAge::OneToTwoYears).into(),
            vehicle_age_lt_1: (req.vehicle_age == VehicleAge::UnderOneYear).into(),
            vehicle_age_gt_2: (req.vehicle_age == VehicleAge::OverTwoYears).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_accepts_bool_and_number() {
        let flags: Vec<Flag> = serde_json::from_str("[true, false, 1, 0, 1.0, 2]").unwrap();
        let parsed: Vec<Option<bool>> = flags.into_iter().map(Flag::as_bool).collect();
        assert_eq!(
            parsed,
            vec![Some(true), Some(false), Some(true), Some(false), Some(true), None]
        );
    }

    #[test]
    fn test_raw_record_training_field_names() {
        let json = r#"{
            "Age": 35, "Driving_License": 1, "Previously_Insured": 0,
            "Annual_Premium": 2500, "Gender_Male": true, "Vehicle_Damage_Yes": true,
            "Vehicle_Age_1_2_Year": true, "Vehicle_Age_lt_1_Year": false,
            "Vehicle_Age_gt_2_Years": false
        }"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.age, 35.0);
        assert_eq!(record.driving_license, Flag::Number(1.0));
        assert_eq!(record.gender_male, Flag::Bool(true));
    }

    #[test]
    fn test_raw_record_descriptive_aliases() {
        let json = r#"{
            "age": 40, "has_driving_license": true, "previously_insured": false,
            "annual_premium": 1000.5, "is_male": false, "vehicle_damaged": false,
            "vehicle_age_1_to_2y": false, "vehicle_age_under_1y": true,
            "vehicle_age_over_2y": false
        }"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.annual_premium, 1000.5);
        assert_eq!(record.vehicle_age_lt_1, Flag::Bool(true));
    }

    #[test]
    fn test_raw_record_missing_field_rejected() {
        let json = r#"{"Age": 35}"#;
        assert!(serde_json::from_str::<RawRecord>(json).is_err());
    }

    #[test]
    fn test_request_to_raw_sets_one_hot() {
        let req = PredictionRequest {
            age: 50,
            has_driving_license: true,
            previously_insured: false,
            annual_premium: 30000.0,
            is_male: false,
            vehicle_damaged: true,
            vehicle_age: VehicleAge::OverTwoYears,
        };
        let raw = RawRecord::from(&req);
        assert_eq!(raw.vehicle_age_gt_2, Flag::Bool(true));
        assert_eq!(raw.vehicle_age_1_2, Flag::Bool(false));
        assert_eq!(raw.vehicle_age_lt_1, Flag::Bool(false));
        assert_eq!(raw.age, 50.0);
    }
}
