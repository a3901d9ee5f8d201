use serde::{Deserialize, Serialize};

use super::input::StrokeInput;

/// Output of the classifier for one patient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class: 1 for stroke, 0 otherwise.
    pub class: u8,
    /// Probability of the positive class.
    pub probability: f64,
}

impl Prediction {
    pub fn label(&self) -> &'static str {
        if self.class == 1 {
            "Stroke"
        } else {
            "No Stroke"
        }
    }
}

/// Body returned by a successful `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// `"Stroke"` or `"No Stroke"`.
    pub prediction: String,
    pub probability: f64,
    pub status: String,
    /// The request body, echoed back.
    pub input: StrokeInput,
}

impl PredictionResponse {
    pub fn new(prediction: Prediction, input: StrokeInput) -> Self {
        Self {
            prediction: prediction.label().to_string(),
            probability: prediction.probability,
            status: "success".to_string(),
            input,
        }
    }
}

/// Summary of the loaded model, served by `GET /model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub objective: String,
    pub num_trees: usize,
    pub num_features: usize,
    pub feature_names: Vec<String>,
    pub threshold: f64,
}
