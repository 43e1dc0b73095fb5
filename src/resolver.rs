//! Top-down time mention resolution over constituency trees.
//!
//! For each tree of a segment the resolver starts at the root's first child
//! and visits nodes depth first, left to right. Every visited node gets a
//! feature vector and a category:
//!
//! - in training, a node is a mention iff a gold span from the segment's
//!   working set equals the node span. Matching gold spans are consumed, and
//!   nodes covering fewer than [`SPAN_LIMIT`] tokens are written as
//!   training instances;
//! - in inference, the classifier labels the node and mentions are emitted
//!   with the first score of the classifier's score list.
//!
//! Recursion stops at leaves and at mentions, and skips nodes of at least
//! [`SPAN_LIMIT`] tokens that contain neither a time word nor a gold span.

use crate::classifier::{Category, SpanClassifier};
use crate::document::Segment;
use crate::errors::{TimexError, TimexResult};
use crate::features::{FeatureComposer, FeatureVector};
use crate::lexicon::TimeWordLexicon;
use crate::sink::{InstanceSink, MentionSink, TimeMention, TrainingInstance};
use crate::span::Span;
use crate::tree::{NodeId, ParseTree};
use std::sync::Arc;
use tracing::{debug, trace};

/// Token count from which nodes are not written as training instances and,
/// without evidence, not descended into.
pub const SPAN_LIMIT: usize = 12;

/// The gold time spans of one segment that are still unmatched.
///
/// Duplicates are kept; an exact match consumes every copy of the span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoldMentions {
    spans: Vec<Span>,
}

impl GoldMentions {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Returns true if some remaining gold span lies inside `span`.
    pub fn any_within(&self, span: Span) -> bool {
        self.spans.iter().any(|gold| span.covers(*gold))
    }

    /// Remove every gold span equal to `span`, returning how many matched.
    pub fn take_exact(&mut self, span: Span) -> usize {
        let before = self.spans.len();
        self.spans.retain(|gold| *gold != span);
        before - self.spans.len()
    }

    pub fn remaining(&self) -> &[Span] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// A node visited during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisitedNode {
    /// Index of the tree within the segment
    pub tree: usize,
    pub node: NodeId,
    pub category: Category,
}

/// What happened while resolving one segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentReport {
    /// Nodes in visiting order
    pub visited: Vec<VisitedNode>,
    pub instances_written: usize,
    pub mentions_found: usize,
    /// Gold spans no visited node matched exactly
    pub unmatched_gold: Vec<Span>,
}

/// Evidence gathered for a node before its category is decided.
#[derive(Debug, Clone, Copy)]
struct Evidence {
    token_count: usize,
    contains_time_word: bool,
    contains_gold_time: bool,
}

impl Evidence {
    fn prunes_children(&self) -> bool {
        !self.contains_gold_time && !self.contains_time_word && self.token_count >= SPAN_LIMIT
    }
}

/// The mode-specific label decision and emission step.
trait LabelStep {
    fn contains_gold(&self, span: Span) -> bool;

    fn decide(
        &mut self,
        span: Span,
        evidence: &Evidence,
        features: FeatureVector,
    ) -> TimexResult<Category>;
}

struct Training<'s, S: ?Sized> {
    sink: &'s mut S,
    gold: GoldMentions,
    written: usize,
}

impl<S: InstanceSink + ?Sized> LabelStep for Training<'_, S> {
    fn contains_gold(&self, span: Span) -> bool {
        self.gold.any_within(span)
    }

    fn decide(
        &mut self,
        span: Span,
        evidence: &Evidence,
        features: FeatureVector,
    ) -> TimexResult<Category> {
        let category = if self.gold.take_exact(span) > 0 {
            Category::Mention
        } else {
            Category::NonMention
        };
        if evidence.token_count < SPAN_LIMIT {
            self.sink.write(TrainingInstance {
                label: category,
                features,
            })?;
            self.written += 1;
        }
        Ok(category)
    }
}

struct Inference<'c, 's, C: ?Sized, S: ?Sized> {
    classifier: &'c C,
    sink: &'s mut S,
    found: usize,
}

impl<C: SpanClassifier + ?Sized, S: MentionSink + ?Sized> LabelStep for Inference<'_, '_, C, S> {
    fn contains_gold(&self, _span: Span) -> bool {
        false
    }

    fn decide(
        &mut self,
        span: Span,
        _evidence: &Evidence,
        features: FeatureVector,
    ) -> TimexResult<Category> {
        // The first listed score is used whichever class it belongs to.
        let confidence = self
            .classifier
            .score(&features)?
            .first()
            .map(|class| class.score)
            .ok_or_else(|| TimexError::Classification {
                message: format!("classifier returned no scores for node {}", span),
            })?;
        let category = self.classifier.classify(&features)?;
        if category.is_mention() {
            self.sink.insert(TimeMention { span, confidence })?;
            self.found += 1;
        }
        Ok(category)
    }
}

/// Resolves time mentions over the constituency trees of a segment.
///
/// The resolver is immutable and can be shared across threads; all
/// per-segment state lives in the call.
#[derive(Debug, Clone)]
pub struct TimeMentionResolver {
    composer: FeatureComposer,
}

impl TimeMentionResolver {
    pub fn new(lexicon: Arc<TimeWordLexicon>) -> Self {
        Self {
            composer: FeatureComposer::new(lexicon),
        }
    }

    /// Resolver over the lexicon bundled with the crate.
    pub fn with_bundled_lexicon() -> TimexResult<Self> {
        Ok(Self::new(TimeWordLexicon::bundled()?))
    }

    pub fn lexicon(&self) -> &TimeWordLexicon {
        self.composer.lexicon()
    }

    /// Write training instances for `segment` against its gold spans.
    pub fn train_segment<S: InstanceSink + ?Sized>(
        &self,
        segment: &Segment,
        sink: &mut S,
    ) -> TimexResult<SegmentReport> {
        let mut step = Training {
            sink,
            gold: GoldMentions::new(segment.gold().to_vec()),
            written: 0,
        };
        let mut report = self.resolve(segment, &mut step)?;
        report.instances_written = step.written;
        report.unmatched_gold = step.gold.remaining().to_vec();
        debug!(
            visited = report.visited.len(),
            instances = report.instances_written,
            unmatched_gold = report.unmatched_gold.len(),
            "trained segment"
        );
        Ok(report)
    }

    /// Classify the nodes of `segment`, inserting mentions into `sink`.
    pub fn annotate_segment<C: SpanClassifier + ?Sized, S: MentionSink + ?Sized>(
        &self,
        segment: &Segment,
        classifier: &C,
        sink: &mut S,
    ) -> TimexResult<SegmentReport> {
        let mut step = Inference {
            classifier,
            sink,
            found: 0,
        };
        let mut report = self.resolve(segment, &mut step)?;
        report.mentions_found = step.found;
        debug!(
            visited = report.visited.len(),
            mentions = report.mentions_found,
            "annotated segment"
        );
        Ok(report)
    }

    fn resolve(&self, segment: &Segment, step: &mut dyn LabelStep) -> TimexResult<SegmentReport> {
        let mut report = SegmentReport::default();
        for (tree_idx, tree) in segment.trees().iter().enumerate() {
            if let Some(top) = tree.top_child() {
                let mut walk = Walk {
                    composer: &self.composer,
                    segment,
                    tree_idx,
                    tree,
                    step: &mut *step,
                    report: &mut report,
                };
                walk.visit(top, Category::NonMention)?;
            }
        }
        Ok(report)
    }
}

/// Recursion state for one tree.
struct Walk<'a> {
    composer: &'a FeatureComposer,
    segment: &'a Segment,
    tree_idx: usize,
    tree: &'a ParseTree,
    step: &'a mut dyn LabelStep,
    report: &'a mut SegmentReport,
}

impl Walk<'_> {
    fn visit(&mut self, id: NodeId, parent_category: Category) -> TimexResult<()> {
        let (tree, segment) = (self.tree, self.segment);
        let node = &tree[id];
        let span = node.span();
        let covered = segment.tokens().covered(span);

        let features = self.composer.compose(tree, id, parent_category, covered)?;
        let lexicon = self.composer.lexicon();
        let evidence = Evidence {
            token_count: covered.len(),
            contains_time_word: covered.iter().any(|t| lexicon.is_time_word(&t.text)),
            contains_gold_time: self.step.contains_gold(span),
        };

        let category = self.step.decide(span, &evidence, features)?;
        trace!(
            tree = self.tree_idx,
            node = id.index(),
            label = node.label(),
            %span,
            tokens = evidence.token_count,
            %category,
            "resolved node"
        );
        self.report.visited.push(VisitedNode {
            tree: self.tree_idx,
            node: id,
            category,
        });

        if node.is_leaf() || category.is_mention() || evidence.prunes_children() {
            return Ok(());
        }
        for child in node.children() {
            self.visit(*child, category)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_exact_consumes_all_duplicates() {
        let mut gold = GoldMentions::new(vec![
            Span::new(10, 16),
            Span::new(20, 24),
            Span::new(10, 16),
        ]);
        assert!(gold.any_within(Span::new(0, 30)));
        assert!(gold.any_within(Span::new(10, 16)));
        assert!(!gold.any_within(Span::new(11, 16)));

        assert_eq!(gold.take_exact(Span::new(10, 16)), 2);
        assert_eq!(gold.take_exact(Span::new(10, 16)), 0);
        assert_eq!(gold.remaining(), &[Span::new(20, 24)]);
    }

    #[test]
    fn pruning_needs_all_three_conditions() {
        let long = Evidence {
            token_count: SPAN_LIMIT,
            contains_time_word: false,
            contains_gold_time: false,
        };
        assert!(long.prunes_children());
        assert!(!Evidence {
            token_count: SPAN_LIMIT - 1,
            ..long
        }
        .prunes_children());
        assert!(!Evidence {
            contains_time_word: true,
            ..long
        }
        .prunes_children());
        assert!(!Evidence {
            contains_gold_time: true,
            ..long
        }
        .prunes_children());
    }

    #[test]
    fn resolver_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TimeMentionResolver>();
        assert_send_sync::<Segment>();
    }
}
