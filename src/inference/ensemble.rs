use std::collections::HashMap;
use std::path::Path;

use crate::models::{ModelInfo, PatientRecord, Prediction};

use super::artifact::{DumpNode, ModelArtifact};
use super::encoder::FeatureEncoder;
use super::error::{ModelError, Result};
use super::StrokeModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Objective {
    Logistic,
    LogitRaw,
}

impl Objective {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "binary:logistic" => Some(Self::Logistic),
            "binary:logitraw" => Some(Self::LogitRaw),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Logistic => "binary:logistic",
            Self::LogitRaw => "binary:logitraw",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        yes: usize,
        no: usize,
        missing: usize,
    },
    Leaf(f32),
}

/// A single regression tree, flattened into an arena with the root at index 0.
#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn leaf_value(&self, features: &[f32]) -> f32 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    let x = features[feature];
                    idx = if x.is_nan() {
                        missing
                    } else if x < threshold {
                        yes
                    } else {
                        no
                    };
                }
            }
        }
    }
}

/// A gradient-boosted binary classifier loaded from a [`ModelArtifact`].
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    name: String,
    objective: Objective,
    base_margin: f64,
    threshold: f64,
    feature_names: Vec<String>,
    encoder: FeatureEncoder,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Read and validate an artifact file. A missing file is [`ModelError::NotFound`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ModelError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_json(&content)
    }

    /// Parse an artifact from its JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    /// Validate an artifact and flatten its trees for evaluation.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        let objective = Objective::from_str(&artifact.objective).ok_or_else(|| {
            ModelError::invalid(format!("unsupported objective '{}'", artifact.objective))
        })?;

        let base_margin = match objective {
            Objective::Logistic => {
                let p = artifact.base_score;
                if !(p > 0.0 && p < 1.0) {
                    return Err(ModelError::invalid(format!(
                        "base_score {} must be in (0, 1) for binary:logistic",
                        p
                    )));
                }
                (p / (1.0 - p)).ln()
            }
            Objective::LogitRaw => {
                if !artifact.base_score.is_finite() {
                    return Err(ModelError::invalid("base_score must be finite"));
                }
                artifact.base_score
            }
        };

        if !(0.0..=1.0).contains(&artifact.threshold) {
            return Err(ModelError::invalid(format!(
                "threshold {} must be in [0, 1]",
                artifact.threshold
            )));
        }
        if artifact.trees.is_empty() {
            return Err(ModelError::invalid("model has no trees"));
        }

        let encoder = FeatureEncoder::new(&artifact.feature_names)?;
        let trees = artifact
            .trees
            .iter()
            .enumerate()
            .map(|(i, root)| {
                flatten_tree(root, &artifact.feature_names)
                    .map_err(|message| ModelError::invalid(format!("tree {}: {}", i, message)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: artifact.name,
            objective,
            base_margin,
            threshold: artifact.threshold,
            feature_names: artifact.feature_names,
            encoder,
            trees,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Sum of leaf values plus the base margin, before the sigmoid.
    pub fn margin(&self, features: &[f32]) -> Result<f64> {
        if features.len() != self.encoder.len() {
            return Err(ModelError::FeatureCount {
                expected: self.encoder.len(),
                actual: features.len(),
            });
        }
        let leaves: f64 = self
            .trees
            .iter()
            .map(|t| f64::from(t.leaf_value(features)))
            .sum();
        Ok(self.base_margin + leaves)
    }

    /// Score an already-encoded feature vector, in `feature_names` order.
    pub fn predict_features(&self, features: &[f32]) -> Result<Prediction> {
        let margin = self.margin(features)?;
        let probability = 1.0 / (1.0 + (-margin).exp());
        Ok(Prediction {
            class: u8::from(probability > self.threshold),
            probability,
        })
    }
}

impl StrokeModel for TreeEnsemble {
    fn predict(&self, record: &PatientRecord) -> Result<Prediction> {
        self.predict_features(&self.encoder.encode(record))
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            name: self.name.clone(),
            objective: self.objective.as_str().to_string(),
            num_trees: self.trees.len(),
            num_features: self.feature_names.len(),
            feature_names: self.feature_names.clone(),
            threshold: self.threshold,
        }
    }
}

/// Resolve a dump split name to a column index. Dumps of boosters trained
/// without feature names use `f0`, `f1`, ...
fn resolve_feature(name: &str, feature_names: &[String]) -> Option<usize> {
    if let Some(idx) = feature_names.iter().position(|f| f == name) {
        return Some(idx);
    }
    name.strip_prefix('f')
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|&idx| idx < feature_names.len())
}

fn flatten_tree(root: &DumpNode, feature_names: &[String]) -> std::result::Result<Tree, String> {
    // Gather every node by id, root first, so the root lands at arena index 0.
    let mut order: Vec<&DumpNode> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if index.insert(node.nodeid(), order.len()).is_some() {
            return Err(format!("duplicate node id {}", node.nodeid()));
        }
        order.push(node);
        if let DumpNode::Split { children, .. } = node {
            stack.extend(children.iter().rev());
        }
    }

    let lookup = |id: u32| {
        index
            .get(&id)
            .copied()
            .ok_or_else(|| format!("reference to missing node {}", id))
    };

    let nodes = order
        .iter()
        .map(|node| -> std::result::Result<Node, String> {
            match node {
                DumpNode::Leaf { leaf, .. } => Ok(Node::Leaf(*leaf as f32)),
                DumpNode::Split {
                    nodeid,
                    split,
                    split_condition,
                    yes,
                    no,
                    missing,
                    ..
                } => {
                    let feature = resolve_feature(split, feature_names).ok_or_else(|| {
                        format!("node {} splits on unknown feature '{}'", nodeid, split)
                    })?;
                    Ok(Node::Split {
                        feature,
                        threshold: *split_condition as f32,
                        yes: lookup(*yes)?,
                        no: lookup(*no)?,
                        missing: lookup(*missing)?,
                    })
                }
            }
        })
        .collect::<std::result::Result<Vec<_>, String>>()?;

    check_acyclic(&nodes)?;
    Ok(Tree { nodes })
}

/// Reject child links that loop back, so evaluation always reaches a leaf.
fn check_acyclic(nodes: &[Node]) -> std::result::Result<(), String> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; nodes.len()];
    // (node, children already pushed)
    let mut stack = vec![(0usize, false)];
    while let Some((idx, expanded)) = stack.pop() {
        if expanded {
            marks[idx] = Mark::Done;
            continue;
        }
        match marks[idx] {
            Mark::Done => continue,
            Mark::InProgress => return Err(format!("cycle through node index {}", idx)),
            Mark::Unvisited => {}
        }
        marks[idx] = Mark::InProgress;
        stack.push((idx, true));
        if let Node::Split { yes, no, missing, .. } = nodes[idx] {
            for child in [yes, no, missing] {
                match marks[child] {
                    Mark::InProgress => {
                        return Err(format!("cycle through node index {}", child))
                    }
                    Mark::Unvisited => stack.push((child, false)),
                    Mark::Done => {}
                }
            }
        }
    }
    Ok(())
}
