use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid model: {message}")]
    Invalid { message: String },

    #[error("Feature vector has {actual} values, model expects {expected}")]
    FeatureCount { expected: usize, actual: usize },
}

impl ModelError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
