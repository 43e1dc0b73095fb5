//! The span classifier capability and a minimal persisted linear model.
//!
//! Classifier training and inference are external concerns. The resolver
//! only needs [`SpanClassifier`]: a predicted [`Category`] and a list of
//! per-class scores for a feature vector. [`LinearModel`] is a small
//! logistic model read from `model.json` so inference can run end to end.

use crate::errors::{TimexError, TimexResult};
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

/// Outcome label of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "TIME_MENTION")]
    Mention,
    #[serde(rename = "NON_TIME_MENTION")]
    NonMention,
}

impl Category {
    pub const MENTION_LABEL: &'static str = "TIME_MENTION";
    pub const NON_MENTION_LABEL: &'static str = "NON_TIME_MENTION";

    pub fn label(self) -> &'static str {
        match self {
            Category::Mention => Self::MENTION_LABEL,
            Category::NonMention => Self::NON_MENTION_LABEL,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            Self::MENTION_LABEL => Some(Category::Mention),
            Self::NON_MENTION_LABEL => Some(Category::NonMention),
            _ => None,
        }
    }

    pub fn is_mention(self) -> bool {
        self == Category::Mention
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score assigned to one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassScore {
    pub category: Category,
    pub score: f64,
}

/// Inference-side classifier.
pub trait SpanClassifier {
    /// Predicted outcome for `features`.
    fn classify(&self, features: &FeatureVector) -> TimexResult<Category>;

    /// Per-class scores for `features`, best first.
    fn score(&self, features: &FeatureVector) -> TimexResult<Vec<ClassScore>>;
}

impl<C: SpanClassifier + ?Sized> SpanClassifier for &C {
    fn classify(&self, features: &FeatureVector) -> TimexResult<Category> {
        (**self).classify(features)
    }

    fn score(&self, features: &FeatureVector) -> TimexResult<Vec<ClassScore>> {
        (**self).score(features)
    }
}

/// Binary logistic model over feature keys.
///
/// Feature keys are `NAME` for indicators and `NAME=value` otherwise; each
/// occurrence in the vector adds its weight once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default)]
    pub bias: f64,
    #[serde(default)]
    pub weights: HashMap<String, f64>,
}

impl LinearModel {
    /// File name of the model inside a model directory.
    pub const FILE_NAME: &'static str = "model.json";

    /// Load `model.json` from `model_dir`, or `model_dir` itself when it is a file.
    pub fn load(model_dir: &Path) -> TimexResult<Self> {
        let path = if model_dir.is_dir() {
            model_dir.join(Self::FILE_NAME)
        } else {
            model_dir.to_path_buf()
        };
        let content = fs::read_to_string(&path).map_err(|e| TimexError::ModelLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let model: LinearModel =
            serde_json::from_str(&content).map_err(|e| TimexError::ModelLoad {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        info!(path = %path.display(), weights = model.weights.len(), "loaded time mention model");
        Ok(model)
    }

    /// Write the model as pretty JSON to `model_dir/model.json`.
    pub fn save(&self, model_dir: &Path) -> TimexResult<()> {
        fs::create_dir_all(model_dir).map_err(|e| TimexError::io(model_dir.display(), e))?;
        let path = model_dir.join(Self::FILE_NAME);
        let json = serde_json::to_string_pretty(self).map_err(|e| TimexError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        fs::write(&path, json).map_err(|e| TimexError::io(path.display(), e))
    }

    /// Probability of the mention class.
    pub fn mention_probability(&self, features: &FeatureVector) -> f64 {
        let activation = features.iter().fold(self.bias, |acc, feature| {
            acc + self.weights.get(&feature.key()).copied().unwrap_or(0.0)
        });
        1.0 / (1.0 + (-activation).exp())
    }
}

impl SpanClassifier for LinearModel {
    fn classify(&self, features: &FeatureVector) -> TimexResult<Category> {
        Ok(if self.mention_probability(features) > 0.5 {
            Category::Mention
        } else {
            Category::NonMention
        })
    }

    fn score(&self, features: &FeatureVector) -> TimexResult<Vec<ClassScore>> {
        let p = self.mention_probability(features);
        if !p.is_finite() {
            return Err(TimexError::Classification {
                message: format!("non-finite mention probability {}", p),
            });
        }
        let mention = ClassScore {
            category: Category::Mention,
            score: p,
        };
        let other = ClassScore {
            category: Category::NonMention,
            score: 1.0 - p,
        };
        Ok(if p > 0.5 {
            vec![mention, other]
        } else {
            vec![other, mention]
        })
    }
}
