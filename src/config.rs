//! Annotator configuration.
//!
//! ```toml
//! [lexicon]
//! path = "resources/time_word_types.txt"
//!
//! [mode]
//! kind = "inference"
//! model_path = "models/timex"
//! ```

use crate::errors::{TimexError, TimexResult};
use crate::lexicon::TimeWordLexicon;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the time-word lexicon comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Lexicon file; the bundled table is used when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Training or inference, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModeConfig {
    /// Write training instances into `output_dir`.
    Training { output_dir: PathBuf },
    /// Classify with the model stored at `model_path`.
    Inference { model_path: PathBuf },
}

/// Configuration for an annotation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    #[serde(default)]
    pub lexicon: LexiconConfig,
    pub mode: ModeConfig,
}

impl AnnotatorConfig {
    pub fn training(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            lexicon: LexiconConfig::default(),
            mode: ModeConfig::Training {
                output_dir: output_dir.into(),
            },
        }
    }

    pub fn inference(model_path: impl Into<PathBuf>) -> Self {
        Self {
            lexicon: LexiconConfig::default(),
            mode: ModeConfig::Inference {
                model_path: model_path.into(),
            },
        }
    }

    /// Use the lexicon file at `path` instead of the bundled one.
    pub fn with_lexicon_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lexicon.path = Some(path.into());
        self
    }

    pub fn from_toml_str(content: &str) -> TimexResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| TimexError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> TimexResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| TimexError::io(path.display(), e))?;
        Self::from_toml_str(&content)
    }

    pub fn is_training(&self) -> bool {
        matches!(self.mode, ModeConfig::Training { .. })
    }

    /// Validate the configuration
    pub fn validate(&self) -> TimexResult<()> {
        let (field, path) = match &self.mode {
            ModeConfig::Training { output_dir } => ("output_dir", output_dir),
            ModeConfig::Inference { model_path } => ("model_path", model_path),
        };
        if path.as_os_str().is_empty() {
            return Err(TimexError::Config {
                message: format!("{} must not be empty", field),
            });
        }
        Ok(())
    }

    /// The configured lexicon, loaded from disk or the bundled table.
    pub fn load_lexicon(&self) -> TimexResult<Arc<TimeWordLexicon>> {
        match &self.lexicon.path {
            Some(path) => Ok(Arc::new(TimeWordLexicon::load(path)?)),
            None => TimeWordLexicon::bundled(),
        }
    }
}
