//! Core types for `.toml` time mention fixtures.
//!
//! ```toml
//! title = "Weekday after a preposition"
//!
//! [[segments]]
//! text = "Seen on Monday"
//! trees = ["(TOP (S (VBN Seen) (PP (IN on) (NP (NNP Monday)))))"]
//! gold = ["Monday"]
//!
//! [segments.expect]
//! instances = ["S NON_TIME_MENTION", "VBN NON_TIME_MENTION"]
//! mentions = ["Monday"]
//! ```

use crate::errors::{SpecError, SpecResult};
use layered_timex::{
    ClinicalDocument, LinearModel, Segment, Span, TimeMentionResolver, TimeWordLexicon,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A parsed fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimexFixture {
    #[serde(default)]
    pub title: Option<String>,
    /// Inline lexicon in `CATEGORY word` lines; the bundled lexicon otherwise.
    #[serde(default)]
    pub lexicon: Option<String>,
    /// Model used for the inference pass. Without one only training runs.
    #[serde(default)]
    pub model: Option<LinearModel>,
    pub segments: Vec<SegmentFixture>,
}

/// One segment of a fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentFixture {
    pub text: String,
    /// Bracketed trees, one per sentence, in text order
    pub trees: Vec<String>,
    #[serde(default)]
    pub gold: Vec<TextRef>,
    #[serde(default)]
    pub expect: Expectations,
}

/// Expected results for a segment. Absent fields are not checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expectations {
    /// `NODE_LABEL CATEGORY` per written training instance
    #[serde(default)]
    pub instances: Option<Vec<String>>,
    /// Covered text of each inferred mention
    #[serde(default)]
    pub mentions: Option<Vec<String>>,
    /// Covered text of gold spans left unmatched by training
    #[serde(default)]
    pub unmatched_gold: Option<Vec<String>>,
}

/// Reference to segment text by content, with an optional 0-based occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextRef {
    Text(String),
    Occurrence { text: String, occurrence: usize },
}

impl TextRef {
    pub fn text(&self) -> &str {
        match self {
            TextRef::Text(text) | TextRef::Occurrence { text, .. } => text,
        }
    }

    pub fn occurrence(&self) -> usize {
        match self {
            TextRef::Text(_) => 0,
            TextRef::Occurrence { occurrence, .. } => *occurrence,
        }
    }

    /// Character span of the referenced occurrence within `haystack`.
    pub fn resolve(&self, haystack: &str) -> SpecResult<Span> {
        let needle = self.text();
        haystack
            .match_indices(needle)
            .nth(self.occurrence())
            .map(|(at, _)| {
                let begin = haystack[..at].chars().count();
                Span::new(begin, begin + needle.chars().count())
            })
            .ok_or_else(|| SpecError::Assertion {
                message: format!("{} not found in {:?}", self, haystack),
            })
    }
}

impl fmt::Display for TextRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.occurrence() {
            0 => write!(f, "[\"{}\"]", self.text()),
            n => write!(f, "[\"{}\"@{}]", self.text(), n),
        }
    }
}

/// Parse fixture TOML.
pub fn parse_fixture(content: &str) -> SpecResult<TimexFixture> {
    toml::from_str(content).map_err(|e| SpecError::Parse {
        message: e.to_string(),
    })
}

impl TimexFixture {
    /// Build the document, resolving gold references against each segment.
    pub fn to_document(&self) -> SpecResult<ClinicalDocument> {
        let mut segments = Vec::with_capacity(self.segments.len());
        for fixture in &self.segments {
            let gold = fixture
                .gold
                .iter()
                .map(|reference| reference.resolve(&fixture.text))
                .collect::<SpecResult<Vec<_>>>()?;
            let segment = Segment::from_bracketed(fixture.text.as_str(), fixture.trees.as_slice())?;
            segments.push(segment.with_gold(gold));
        }
        Ok(ClinicalDocument::new(segments))
    }

    pub fn resolver(&self) -> SpecResult<TimeMentionResolver> {
        let resolver = match &self.lexicon {
            Some(source) => TimeMentionResolver::new(Arc::new(TimeWordLexicon::parse(source)?)),
            None => TimeMentionResolver::with_bundled_lexicon()?,
        };
        Ok(resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_refs_resolve_by_occurrence() {
        let text = "daily for two days then daily";
        let first = TextRef::Text("daily".to_string());
        let second = TextRef::Occurrence {
            text: "daily".to_string(),
            occurrence: 1,
        };
        assert_eq!(first.resolve(text).unwrap(), Span::new(0, 5));
        assert_eq!(second.resolve(text).unwrap(), Span::new(24, 29));
        assert_eq!(second.to_string(), "[\"daily\"@1]");

        let after_degrees = TextRef::Text("Monday".to_string());
        assert_eq!(
            after_degrees.resolve("Temp 38°C Monday").unwrap(),
            Span::new(10, 16)
        );

        let missing = TextRef::Text("weekly".to_string());
        assert!(matches!(
            missing.resolve(text),
            Err(SpecError::Assertion { .. })
        ));
    }

    #[test]
    fn parses_both_gold_forms() {
        let fixture = parse_fixture(
            r#"
            [[segments]]
            text = "Monday and Monday"
            trees = ["(TOP (NP (NNP Monday) (CC and) (NNP Monday)))"]
            gold = ["Monday", { text = "Monday", occurrence = 1 }]
            "#,
        )
        .unwrap();
        let document = fixture.to_document().unwrap();
        assert_eq!(
            document.segments()[0].gold(),
            &[Span::new(0, 6), Span::new(11, 17)]
        );
        assert!(fixture.model.is_none());
        assert!(fixture.segments[0].expect.instances.is_none());
    }

    #[test]
    fn rejects_fixture_without_segments() {
        assert!(matches!(
            parse_fixture("title = \"empty\""),
            Err(SpecError::Parse { .. })
        ));
    }
}
