use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::category::{quoted_list, SmokingStatus, WorkType};

/// Request body for `POST /predict`.
///
/// Categorical fields arrive as free text and are only checked by
/// [`StrokeInput::validate`], so a bad value produces a readable 400 instead
/// of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeInput {
    pub age: f64,
    /// 1 when the patient's average glucose level is above the clinical cutoff.
    /// Integral floats such as `1.0` are accepted; range is checked by `validate`.
    #[serde(deserialize_with = "integral_number")]
    pub high_glucose_flag: i64,
    pub bmi: f64,
    pub smoking_status: String,
    pub work_type: String,
}

/// A request that passed validation, with categoricals resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatientRecord {
    pub age: f64,
    pub high_glucose: bool,
    pub bmi: f64,
    pub smoking_status: SmokingStatus,
    pub work_type: WorkType,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Age must be non-negative.")]
    NegativeAge,
    #[error("high_glucose_flag must be 0 or 1.")]
    GlucoseFlag,
    #[error("BMI must be positive.")]
    NonPositiveBmi,
    #[error("smoking_status must be one of {allowed}.", allowed = quoted_list(SmokingStatus::ALL.iter().map(|s| s.as_str())))]
    SmokingStatus,
    #[error("work_type must be one of {allowed}.", allowed = quoted_list(WorkType::ALL.iter().map(|w| w.as_str())))]
    WorkType,
}

/// Accept any JSON number with no fractional part.
fn integral_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(de::Error::custom(format!(
            "invalid value: {}, expected an integer",
            number
        ))),
    }
}

impl StrokeInput {
    /// Check each field in turn; the first failing rule is reported.
    pub fn validate(&self) -> Result<PatientRecord, ValidationError> {
        // NaN and infinities fail the same rules as out-of-range numbers
        if !self.age.is_finite() || self.age < 0.0 {
            return Err(ValidationError::NegativeAge);
        }
        let high_glucose = match self.high_glucose_flag {
            0 => false,
            1 => true,
            _ => return Err(ValidationError::GlucoseFlag),
        };
        if !self.bmi.is_finite() || self.bmi <= 0.0 {
            return Err(ValidationError::NonPositiveBmi);
        }
        let smoking_status =
            SmokingStatus::from_str(&self.smoking_status).ok_or(ValidationError::SmokingStatus)?;
        let work_type = WorkType::from_str(&self.work_type).ok_or(ValidationError::WorkType)?;

        Ok(PatientRecord {
            age: self.age,
            high_glucose,
            bmi: self.bmi,
            smoking_status,
            work_type,
        })
    }
}
