//! Turns a validated [`PatientRecord`] into the model's feature vector.
//!
//! This replaces the preprocessing half of the training pipeline: numeric
//! columns pass through and categoricals are one-hot encoded into columns
//! named `<field>_<value>`, in whatever order the model was trained with.

use std::collections::HashSet;

use crate::models::{PatientRecord, SmokingStatus, WorkType};

use super::error::{ModelError, Result};

const SMOKING_PREFIX: &str = "smoking_status_";
const WORK_PREFIX: &str = "work_type_";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Column {
    Age,
    HighGlucose,
    Bmi,
    Smoking(SmokingStatus),
    Work(WorkType),
}

impl Column {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "age" => return Some(Self::Age),
            "high_glucose_flag" => return Some(Self::HighGlucose),
            "bmi" => return Some(Self::Bmi),
            _ => {}
        }
        if let Some(value) = name.strip_prefix(SMOKING_PREFIX) {
            return SmokingStatus::from_str(value).map(Self::Smoking);
        }
        if let Some(value) = name.strip_prefix(WORK_PREFIX) {
            return WorkType::from_str(value).map(Self::Work);
        }
        None
    }

    fn value(&self, record: &PatientRecord) -> f32 {
        let indicator = |hit: bool| if hit { 1.0 } else { 0.0 };
        match self {
            Self::Age => record.age as f32,
            Self::HighGlucose => indicator(record.high_glucose),
            Self::Bmi => record.bmi as f32,
            Self::Smoking(status) => indicator(record.smoking_status == *status),
            Self::Work(work) => indicator(record.work_type == *work),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    columns: Vec<Column>,
}

impl FeatureEncoder {
    pub fn new(feature_names: &[String]) -> Result<Self> {
        let mut seen = HashSet::new();
        let columns = feature_names
            .iter()
            .map(|name| {
                if !seen.insert(name.as_str()) {
                    return Err(ModelError::invalid(format!(
                        "duplicate feature column '{}'",
                        name
                    )));
                }
                Column::parse(name).ok_or_else(|| {
                    ModelError::invalid(format!("unknown feature column '{}'", name))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn encode(&self, record: &PatientRecord) -> Vec<f32> {
        self.columns.iter().map(|c| c.value(record)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn record() -> PatientRecord {
        PatientRecord {
            age: 45.5,
            high_glucose: true,
            bmi: 28.25,
            smoking_status: SmokingStatus::Smokes,
            work_type: WorkType::GovtJob,
        }
    }

    #[test]
    fn encodes_numeric_columns_in_model_order() {
        let encoder = FeatureEncoder::new(&names(&["bmi", "age", "high_glucose_flag"])).unwrap();
        assert_eq!(encoder.encode(&record()), vec![28.25, 45.5, 1.0]);
    }

    #[test]
    fn one_hot_sets_only_matching_column() {
        let encoder = FeatureEncoder::new(&names(&[
            "smoking_status_never smoked",
            "smoking_status_smokes",
            "work_type_Private",
            "work_type_Govt_job",
        ]))
        .unwrap();
        assert_eq!(encoder.encode(&record()), vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn dropped_category_encodes_as_all_zeros() {
        let encoder =
            FeatureEncoder::new(&names(&["work_type_Private", "work_type_children"])).unwrap();
        assert_eq!(encoder.encode(&record()), vec![0.0, 0.0]);
    }

    #[test]
    fn rejects_unknown_column() {
        let err = FeatureEncoder::new(&names(&["age", "ever_married"])).unwrap_err();
        assert!(err.to_string().contains("ever_married"));
    }

    #[test]
    fn rejects_unknown_category_value() {
        assert!(FeatureEncoder::new(&names(&["work_type_Astronaut"])).is_err());
    }

    #[test]
    fn rejects_duplicate_column() {
        let err = FeatureEncoder::new(&names(&["age", "age"])).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }
}
