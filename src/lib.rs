#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Constituency-based time mention annotation for clinical text.
//!
//! The annotator walks the constituency trees of a segment top-down and
//! decides for each node whether its span is exactly a time expression.
//! In training mode it writes one labelled feature vector per small node;
//! in inference mode it asks a classifier and records the mentions.
//!
//! ## Core Types
//!
//! - [`ParseTree`] - arena-backed constituency tree
//! - [`TokenLayer`] - tokens with part-of-speech tags
//! - [`TimeWordLexicon`] - `word -> category` table of time words
//! - [`FeatureComposer`] - node features
//! - [`TimeMentionResolver`] - the recursive span resolver
//! - [`AnnotatorSession`] - a configured training or inference run
//!
//! ## Example
//!
//! ```
//! use layered_timex::{Segment, Span, TimeMentionResolver};
//!
//! let segment = Segment::from_bracketed(
//!     "Seen on Monday",
//!     &["(TOP (S (VBN Seen) (PP (IN on) (NP (NNP Monday)))))"],
//! )
//! .unwrap()
//! .with_gold(vec![Span::new(8, 14)]);
//!
//! let resolver = TimeMentionResolver::with_bundled_lexicon().unwrap();
//! let mut instances = Vec::new();
//! let report = resolver.train_segment(&segment, &mut instances).unwrap();
//! assert_eq!(report.instances_written, 5);
//! assert!(report.unmatched_gold.is_empty());
//! ```

mod classifier;
mod config;
mod display;
mod document;
mod errors;
mod features;
mod lexicon;
mod resolver;
mod session;
mod sink;
mod span;
mod token;
mod tree;

pub use classifier::{Category, ClassScore, LinearModel, SpanClassifier};
pub use config::{AnnotatorConfig, LexiconConfig, ModeConfig};
pub use display::SegmentDisplay;
pub use document::{ClinicalDocument, Segment};
pub use errors::{TimexError, TimexResult};
pub use features::{
    char_category_pattern, Feature, FeatureComposer, FeatureVector, PatternType, TokenBag,
    TokenExtractor,
};
pub use lexicon::TimeWordLexicon;
pub use resolver::{GoldMentions, SegmentReport, TimeMentionResolver, VisitedNode, SPAN_LIMIT};
pub use session::AnnotatorSession;
pub use sink::{InstanceSink, InstanceWriter, MentionSink, TimeMention, TrainingInstance};
pub use span::Span;
pub use token::{Token, TokenLayer};
pub use tree::{BracketedReader, NodeId, ParseNode, ParseTree, TreeBuilder};
