//! Request and response types for the prediction API.
//!
//! - [`StrokeInput`]: raw request body, validated into a [`PatientRecord`].
//! - [`SmokingStatus`] / [`WorkType`]: the categorical vocabularies the model was trained on.
//! - [`Prediction`]: classifier output, rendered as a [`PredictionResponse`].

mod category;
mod input;
mod prediction;

pub use category::*;
pub use input::*;
pub use prediction::*;
