use serde::{Deserialize, Serialize};

/// Smoking history as recorded in the training data.
///
/// Wire values match the labels the classifier was trained on, including the
/// capitalised `Unknown` bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SmokingStatus {
    #[serde(rename = "never smoked")]
    NeverSmoked,
    #[serde(rename = "formerly smoked")]
    FormerlySmoked,
    #[serde(rename = "smokes")]
    Smokes,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl SmokingStatus {
    pub const ALL: [Self; 4] = [
        Self::NeverSmoked,
        Self::FormerlySmoked,
        Self::Smokes,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeverSmoked => "never smoked",
            Self::FormerlySmoked => "formerly smoked",
            Self::Smokes => "smokes",
            Self::Unknown => "Unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "never smoked" => Some(Self::NeverSmoked),
            "formerly smoked" => Some(Self::FormerlySmoked),
            "smokes" => Some(Self::Smokes),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Employment category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WorkType {
    Private,
    #[serde(rename = "Self-employed")]
    SelfEmployed,
    #[serde(rename = "Govt_job")]
    GovtJob,
    #[serde(rename = "children")]
    Children,
    #[serde(rename = "Never_worked")]
    NeverWorked,
}

impl WorkType {
    pub const ALL: [Self; 5] = [
        Self::Private,
        Self::SelfEmployed,
        Self::GovtJob,
        Self::Children,
        Self::NeverWorked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::SelfEmployed => "Self-employed",
            Self::GovtJob => "Govt_job",
            Self::Children => "children",
            Self::NeverWorked => "Never_worked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Private" => Some(Self::Private),
            "Self-employed" => Some(Self::SelfEmployed),
            "Govt_job" => Some(Self::GovtJob),
            "children" => Some(Self::Children),
            "Never_worked" => Some(Self::NeverWorked),
            _ => None,
        }
    }
}

/// Render allowed values the way the error messages list them: `['a', 'b']`.
pub(crate) fn quoted_list<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let items: Vec<String> = values.into_iter().map(|v| format!("'{}'", v)).collect();
    format!("[{}]", items.join(", "))
}
