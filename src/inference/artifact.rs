//! On-disk model format.
//!
//! A small envelope around XGBoost's own JSON tree dump
//! (`Booster.get_dump(dump_format="json")`), plus the metadata the dump
//! leaves out: feature order, objective, base score and decision threshold.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_objective")]
    pub objective: String,
    /// Global bias. A probability for `binary:logistic`, a raw margin for `binary:logitraw`.
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Column order of the encoded feature vector.
    pub feature_names: Vec<String>,
    pub trees: Vec<DumpNode>,
}

/// One node of an XGBoost JSON dump. Extra dump fields (`depth`, `gain`,
/// `cover`) are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DumpNode {
    Split {
        nodeid: u32,
        split: String,
        split_condition: f64,
        yes: u32,
        no: u32,
        missing: u32,
        children: Vec<DumpNode>,
    },
    Leaf {
        nodeid: u32,
        leaf: f64,
    },
}

impl DumpNode {
    pub fn nodeid(&self) -> u32 {
        match self {
            Self::Split { nodeid, .. } | Self::Leaf { nodeid, .. } => *nodeid,
        }
    }
}

fn default_name() -> String {
    "stroke_xgb".to_string()
}

fn default_objective() -> String {
    "binary:logistic".to_string()
}

fn default_base_score() -> f64 {
    0.5
}

fn default_threshold() -> f64 {
    0.5
}
