//! Outputs of the resolver: training instances and time mentions.

use crate::classifier::Category;
use crate::errors::{TimexError, TimexResult};
use crate::features::FeatureVector;
use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// A labelled example for classifier training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingInstance {
    pub label: Category,
    pub features: FeatureVector,
}

/// A detected time expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeMention {
    pub span: Span,
    pub confidence: f64,
}

impl TimeMention {
    pub fn begin(&self) -> usize {
        self.span.begin
    }

    pub fn end(&self) -> usize {
        self.span.end
    }
}

/// Receives training instances.
pub trait InstanceSink {
    fn write(&mut self, instance: TrainingInstance) -> TimexResult<()>;
}

/// Receives time mentions for the output annotation index.
pub trait MentionSink {
    fn insert(&mut self, mention: TimeMention) -> TimexResult<()>;
}

impl InstanceSink for Vec<TrainingInstance> {
    fn write(&mut self, instance: TrainingInstance) -> TimexResult<()> {
        self.push(instance);
        Ok(())
    }
}

impl MentionSink for Vec<TimeMention> {
    fn insert(&mut self, mention: TimeMention) -> TimexResult<()> {
        self.push(mention);
        Ok(())
    }
}

impl<S: InstanceSink + ?Sized> InstanceSink for &mut S {
    fn write(&mut self, instance: TrainingInstance) -> TimexResult<()> {
        (**self).write(instance)
    }
}

impl<S: MentionSink + ?Sized> MentionSink for &mut S {
    fn insert(&mut self, mention: TimeMention) -> TimexResult<()> {
        (**self).insert(mention)
    }
}

/// Writes training instances as JSON lines.
pub struct InstanceWriter<W: Write> {
    out: W,
    written: usize,
}

impl InstanceWriter<BufWriter<File>> {
    /// File name of the instance stream inside the output directory.
    pub const FILE_NAME: &'static str = "training-data.jsonl";

    /// Create `output_dir` if needed and open the instance file in it.
    pub fn create(output_dir: &Path) -> TimexResult<Self> {
        fs::create_dir_all(output_dir).map_err(|e| TimexError::io(output_dir.display(), e))?;
        let path = Self::path_in(output_dir);
        let file = File::create(&path).map_err(|e| TimexError::io(path.display(), e))?;
        info!(path = %path.display(), "writing training instances");
        Ok(Self::new(BufWriter::new(file)))
    }

    pub fn path_in(output_dir: &Path) -> PathBuf {
        output_dir.join(Self::FILE_NAME)
    }
}

impl<W: Write> InstanceWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> TimexResult<W> {
        self.out.flush().map_err(|e| TimexError::InstanceWrite {
            message: e.to_string(),
        })?;
        Ok(self.out)
    }
}

impl<W: Write> InstanceSink for InstanceWriter<W> {
    fn write(&mut self, instance: TrainingInstance) -> TimexResult<()> {
        serde_json::to_writer(&mut self.out, &instance).map_err(|e| TimexError::InstanceWrite {
            message: e.to_string(),
        })?;
        self.out
            .write_all(b"\n")
            .map_err(|e| TimexError::InstanceWrite {
                message: e.to_string(),
            })?;
        self.written += 1;
        Ok(())
    }
}
