//! Body mass index calculations.
//!
//! Pure functions; heights are centimetres and weights kilograms.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

const HEALTHY_BMI_MIN: f64 = 18.5;
const HEALTHY_BMI_MAX: f64 = 24.9;

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// Healthy weight bounds for a height, in kg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidMeasurement(format!(
            "{} must be a positive number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn height_m_squared(height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    height_m * height_m
}

/// Calculate BMI, rounded to one decimal place
///
/// Formula: BMI = weight(kg) / height(m)²
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> Result<f64> {
    ensure_positive("weight", weight_kg)?;
    ensure_positive("height", height_cm)?;
    Ok(round1(weight_kg / height_m_squared(height_cm)))
}

/// Classify BMI; bands are half-open with inclusive lower bounds
pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Weight range matching BMI 18.5–24.9 at the given height
pub fn healthy_weight_range(height_cm: f64) -> Result<WeightRange> {
    ensure_positive("height", height_cm)?;
    let h2 = height_m_squared(height_cm);
    Ok(WeightRange {
        min: round1(HEALTHY_BMI_MIN * h2),
        max: round1(HEALTHY_BMI_MAX * h2),
    })
}
