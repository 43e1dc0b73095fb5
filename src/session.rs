//! A configured annotation run.
//!
//! All I/O happens here, outside the per-node recursion: the lexicon and
//! model are read when the session starts and training instances are
//! flushed when it finishes.

use crate::classifier::LinearModel;
use crate::config::{AnnotatorConfig, ModeConfig};
use crate::document::{ClinicalDocument, Segment};
use crate::errors::TimexResult;
use crate::resolver::TimeMentionResolver;
use crate::sink::{InstanceWriter, TimeMention};
use std::fs::File;
use std::io::BufWriter;
use tracing::info;

/// An initialized annotator in training or inference mode.
pub enum AnnotatorSession {
    Training {
        resolver: TimeMentionResolver,
        writer: InstanceWriter<BufWriter<File>>,
    },
    Inference {
        resolver: TimeMentionResolver,
        model: LinearModel,
    },
}

impl AnnotatorSession {
    /// Load the lexicon and either open the instance file or load the model.
    pub fn start(config: &AnnotatorConfig) -> TimexResult<Self> {
        config.validate()?;
        let resolver = TimeMentionResolver::new(config.load_lexicon()?);
        match &config.mode {
            ModeConfig::Training { output_dir } => Ok(AnnotatorSession::Training {
                resolver,
                writer: InstanceWriter::create(output_dir)?,
            }),
            ModeConfig::Inference { model_path } => Ok(AnnotatorSession::Inference {
                resolver,
                model: LinearModel::load(model_path)?,
            }),
        }
    }

    pub fn is_training(&self) -> bool {
        matches!(self, AnnotatorSession::Training { .. })
    }

    /// Run one segment. Training sessions return no mentions.
    pub fn process(&mut self, segment: &Segment) -> TimexResult<Vec<TimeMention>> {
        match self {
            AnnotatorSession::Training { resolver, writer } => {
                resolver.train_segment(segment, writer)?;
                Ok(Vec::new())
            }
            AnnotatorSession::Inference { resolver, model } => {
                let mut mentions = Vec::new();
                resolver.annotate_segment(segment, model, &mut mentions)?;
                Ok(mentions)
            }
        }
    }

    /// Run every segment of `document`, one mention list per segment.
    pub fn process_document(
        &mut self,
        document: &ClinicalDocument,
    ) -> TimexResult<Vec<Vec<TimeMention>>> {
        document
            .segments()
            .iter()
            .map(|segment| self.process(segment))
            .collect()
    }

    /// Flush training output.
    pub fn finish(self) -> TimexResult<()> {
        if let AnnotatorSession::Training { writer, .. } = self {
            let written = writer.written();
            writer.finish()?;
            info!(instances = written, "finished writing training instances");
        }
        Ok(())
    }
}

impl AnnotatorConfig {
    /// Start a session for this configuration.
    pub fn initialize(&self) -> TimexResult<AnnotatorSession> {
        AnnotatorSession::start(self)
    }
}
