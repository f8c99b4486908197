//! Form fields and result rendering

use std::fmt::Write;

use clap::{Args, ValueEnum};
use prediction_core::{PredictionRequest, PredictionResult, RawRecord, VehicleAge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Gender {
    Male,
    Female,
}

/// Vehicle age is a single choice, so the request always has exactly one
/// vehicle-age flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VehicleAgeChoice {
    #[value(name = "lt-1")]
    UnderOneYear,
    #[value(name = "1-2")]
    OneToTwoYears,
    #[value(name = "gt-2")]
    OverTwoYears,
}

impl From<VehicleAgeChoice> for VehicleAge {
    fn from(choice: VehicleAgeChoice) -> Self {
        match choice {
            VehicleAgeChoice::UnderOneYear => VehicleAge::UnderOneYear,
            VehicleAgeChoice::OneToTwoYears => VehicleAge::OneToTwoYears,
            VehicleAgeChoice::OverTwoYears => VehicleAge::OverTwoYears,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct FormArgs {
    /// Client age (18-100)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u8).range(18..=100))]
    pub age: u8,

    /// Client holds a driving license
    #[arg(long)]
    pub driving_license: bool,

    /// Client was previously insured
    #[arg(long)]
    pub previously_insured: bool,

    /// Annual premium
    #[arg(long, default_value_t = 50000.0, value_parser = parse_premium)]
    pub annual_premium: f64,

    #[arg(long, value_enum, default_value_t = Gender::Male)]
    pub gender: Gender,

    /// Vehicle was damaged in the past
    #[arg(long)]
    pub vehicle_damage: bool,

    #[arg(long, value_enum, default_value_t = VehicleAgeChoice::UnderOneYear)]
    pub vehicle_age: VehicleAgeChoice,
}

fn parse_premium(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if !value.is_finite() || value < 0.0 {
        return Err("annual premium must be a non-negative number".to_string());
    }
    Ok(value)
}

impl FormArgs {
    pub fn to_request(&self) -> PredictionRequest {
        PredictionRequest {
            age: self.age,
            has_driving_license: self.driving_license,
            previously_insured: self.previously_insured,
            annual_premium: self.annual_premium,
            is_male: self.gender == Gender::Male,
            vehicle_damaged: self.vehicle_damage,
            vehicle_age: self.vehicle_age.into(),
        }
    }

    pub fn to_record(&self) -> RawRecord {
        RawRecord::from(&self.to_request())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Render a prediction together with the submitted form
pub fn render_result(request: &PredictionRequest, result: &PredictionResult) -> String {
    let marker = if result.numeric_class == 1 { "✅" } else { "❌" };
    let gender = if request.is_male { "male" } else { "female" };

    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "{} {} (class {})", marker, result.label.as_str(), result.numeric_class);
    let _ = writeln!(out, "Request ID: {}\n", result.request_id);
    let _ = writeln!(out, "Details:");
    let _ = writeln!(out, "  Age:                {}", request.age);
    let _ = writeln!(out, "  Driving license:    {}", yes_no(request.has_driving_license));
    let _ = writeln!(out, "  Previously insured: {}", yes_no(request.previously_insured));
    let _ = writeln!(out, "  Annual premium:     {:.0}", request.annual_premium);
    let _ = writeln!(out, "  Gender:             {}", gender);
    let _ = writeln!(out, "  Vehicle damage:     {}", yes_no(request.vehicle_damaged));
    let _ = writeln!(out, "  Vehicle age:        {}", request.vehicle_age.label());
    out
}
