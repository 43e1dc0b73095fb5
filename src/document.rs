//! Segments and documents.
//!
//! A [`Segment`] bundles what upstream components produced for one region
//! of a clinical note: its text, the constituency trees of its sentences,
//! the token layer and, for training documents, the gold time spans.
//! [`ClinicalDocument`] runs the resolver over every segment, each with its
//! own gold working set.

use crate::classifier::SpanClassifier;
use crate::errors::TimexResult;
use crate::resolver::{SegmentReport, TimeMentionResolver};
use crate::sink::{InstanceSink, TimeMention};
use crate::span::Span;
use crate::token::TokenLayer;
use crate::tree::{BracketedReader, ParseTree};

/// One independently processed region of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    text: String,
    trees: Vec<ParseTree>,
    tokens: TokenLayer,
    gold: Vec<Span>,
}

impl Segment {
    pub fn new(text: impl Into<String>, trees: Vec<ParseTree>, tokens: TokenLayer) -> Self {
        Self {
            text: text.into(),
            trees,
            tokens,
            gold: Vec::new(),
        }
    }

    /// Build a segment from bracketed sentence trees over `text`.
    ///
    /// Tokens are taken from the tree leaves, tagged with the leaf labels.
    pub fn from_bracketed<S: AsRef<str>>(text: impl Into<String>, trees: &[S]) -> TimexResult<Self> {
        let text = text.into();
        let mut reader = BracketedReader::new(&text);
        let mut parsed = Vec::with_capacity(trees.len());
        for bracketed in trees {
            parsed.push(reader.read(bracketed.as_ref())?);
        }
        let tokens = TokenLayer::from_tree_leaves(&text, &parsed)?;
        Ok(Self::new(text, parsed, tokens))
    }

    /// Attach gold time spans (training documents).
    pub fn with_gold(mut self, gold: Vec<Span>) -> Self {
        self.gold = gold;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn trees(&self) -> &[ParseTree] {
        &self.trees
    }

    pub fn tokens(&self) -> &TokenLayer {
        &self.tokens
    }

    pub fn gold(&self) -> &[Span] {
        &self.gold
    }

    /// Covered text of `span` within this segment.
    pub fn covered_text(&self, span: Span) -> Option<&str> {
        span.text(&self.text)
    }
}

/// A document made of independently processed segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClinicalDocument {
    segments: Vec<Segment>,
}

impl ClinicalDocument {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn get_segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Emit training instances for every segment, in order.
    pub fn train<S: InstanceSink + ?Sized>(
        &self,
        resolver: &TimeMentionResolver,
        sink: &mut S,
    ) -> TimexResult<Vec<SegmentReport>> {
        self.segments
            .iter()
            .map(|segment| resolver.train_segment(segment, &mut *sink))
            .collect()
    }

    /// Detect time mentions in every segment.
    ///
    /// The outer vector is indexed by segment.
    pub fn annotate<C: SpanClassifier + ?Sized>(
        &self,
        resolver: &TimeMentionResolver,
        classifier: &C,
    ) -> TimexResult<Vec<Vec<TimeMention>>> {
        self.segments
            .iter()
            .map(|segment| {
                let mut mentions = Vec::new();
                resolver.annotate_segment(segment, classifier, &mut mentions)?;
                Ok(mentions)
            })
            .collect()
    }
}
