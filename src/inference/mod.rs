//! Gradient-boosted tree inference.
//!
//! [`TreeEnsemble`] loads an XGBoost JSON dump wrapped in a [`ModelArtifact`],
//! one-hot encodes requests with [`FeatureEncoder`] and evaluates the trees.
//! The HTTP layer only sees the [`StrokeModel`] trait.

mod artifact;
mod encoder;
mod ensemble;
mod error;

pub use artifact::{DumpNode, ModelArtifact};
pub use encoder::FeatureEncoder;
pub use ensemble::TreeEnsemble;
pub use error::{ModelError, Result};

use crate::models::{ModelInfo, PatientRecord, Prediction};

/// A classifier that can score a validated patient record.
pub trait StrokeModel: Send + Sync {
    fn predict(&self, record: &PatientRecord) -> Result<Prediction>;

    fn info(&self) -> ModelInfo;
}
