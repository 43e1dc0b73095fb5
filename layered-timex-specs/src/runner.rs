//! Runs fixtures through training and inference and compares the results.

use crate::errors::SpecResult;
use crate::fixture::TimexFixture;
use layered_timex::{Segment, Span, TimeMentionResolver, TrainingInstance};
use std::fmt;

/// What the annotator produced for one segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentRun {
    /// `NODE_LABEL CATEGORY` per training instance, in writing order
    pub instances: Vec<String>,
    /// Covered text of inferred mentions; empty without a model
    pub mentions: Vec<String>,
    pub unmatched_gold: Vec<String>,
}

/// Result of running a fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureRun {
    pub segments: Vec<(String, SegmentRun)>,
}

/// A difference between an expectation and the produced output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub segment: usize,
    pub field: &'static str,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
}

/// Train on every segment and, when the fixture has a model, annotate it.
pub fn run_fixture(fixture: &TimexFixture) -> SpecResult<FixtureRun> {
    let document = fixture.to_document()?;
    let resolver = fixture.resolver()?;
    let mut run = FixtureRun::default();

    for segment in document.segments() {
        run.segments.push((
            segment.text().to_string(),
            run_segment(&resolver, fixture, segment)?,
        ));
    }
    Ok(run)
}

fn run_segment(
    resolver: &TimeMentionResolver,
    fixture: &TimexFixture,
    segment: &Segment,
) -> SpecResult<SegmentRun> {
    let mut instances: Vec<TrainingInstance> = Vec::new();
    let report = resolver.train_segment(segment, &mut instances)?;

    let mut result = SegmentRun {
        instances: instances
            .iter()
            .map(|instance| {
                format!(
                    "{} {}",
                    instance.features.value_of("NODE_LABEL").unwrap_or("?"),
                    instance.label
                )
            })
            .collect(),
        mentions: Vec::new(),
        unmatched_gold: covered(segment, report.unmatched_gold.iter().copied()),
    };

    if let Some(model) = &fixture.model {
        let mut mentions = Vec::new();
        resolver.annotate_segment(segment, model, &mut mentions)?;
        result.mentions = covered(segment, mentions.iter().map(|m| m.span));
    }
    Ok(result)
}

fn covered(segment: &Segment, spans: impl Iterator<Item = Span>) -> Vec<String> {
    spans
        .map(|span| match segment.covered_text(span) {
            Some(text) => text.to_string(),
            None => span.to_string(),
        })
        .collect()
}

/// Compare a run against the fixture's expectations.
pub fn check_fixture(fixture: &TimexFixture, run: &FixtureRun) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    for (idx, (expected, (_, actual))) in fixture.segments.iter().zip(&run.segments).enumerate() {
        let checks = [
            ("instances", &expected.expect.instances, &actual.instances),
            ("mentions", &expected.expect.mentions, &actual.mentions),
            (
                "unmatched_gold",
                &expected.expect.unmatched_gold,
                &actual.unmatched_gold,
            ),
        ];
        for (field, wanted, got) in checks {
            if let Some(wanted) = wanted {
                if wanted != got {
                    mismatches.push(Mismatch {
                        segment: idx,
                        field,
                        expected: wanted.clone(),
                        actual: got.clone(),
                    });
                }
            }
        }
    }
    mismatches
}

/// Format the mismatches of one fixture for a test failure message.
pub fn format_failure(fixture_name: &str, mismatches: &[Mismatch]) -> String {
    let mut output = format!("FAIL: {}", fixture_name);
    for mismatch in mismatches {
        output.push_str(&format!("\n  {}", mismatch));
    }
    output
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "segment {} {}: expected {:?}, found {:?}",
            self.segment, self.field, self.expected, self.actual
        )
    }
}

impl fmt::Display for FixtureRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        for (idx, (text, run)) in self.segments.iter().enumerate() {
            lines.push(format!("segment {}: {}", idx, text));
            for instance in &run.instances {
                lines.push(format!("  {}", instance));
            }
            if !run.mentions.is_empty() {
                lines.push(format!("  mentions: {}", run.mentions.join(" | ")));
            }
            if !run.unmatched_gold.is_empty() {
                lines.push(format!("  unmatched gold: {}", run.unmatched_gold.join(" | ")));
            }
        }
        f.write_str(&lines.join("\n"))
    }
}
