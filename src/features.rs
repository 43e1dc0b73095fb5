//! Feature vectors for parse-tree nodes.
//!
//! [`FeatureComposer`] turns a node into an ordered multiset of features:
//! structural features of the node and its parent, leaf or production
//! features, and bag-of-token features over the tokens the node covers.
//! Construction is deterministic so repeated runs yield identical vectors.

use crate::classifier::Category;
use crate::errors::{TimexError, TimexResult};
use crate::lexicon::TimeWordLexicon;
use crate::token::Token;
use crate::tree::{NodeId, ParseTree};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use unicode_general_category::{get_general_category, GeneralCategory};

/// A single named feature. Indicators carry no value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Feature {
    pub fn indicator(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// `NAME` or `NAME=value`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => f.write_str(&self.name),
        }
    }
}

/// Ordered features of one node. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<Feature>);

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: Feature) {
        self.0.push(feature);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of occurrences of `name` with `value`.
    pub fn count(&self, name: &str, value: Option<&str>) -> usize {
        self.0
            .iter()
            .filter(|f| f.name == name && f.value.as_deref() == value)
            .count()
    }

    pub fn has_indicator(&self, name: &str) -> bool {
        self.count(name, None) > 0
    }

    /// First value recorded under `name`.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.value.as_deref())
    }
}

impl Extend<Feature> for FeatureVector {
    fn extend<I: IntoIterator<Item = Feature>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<Feature> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FeatureVector {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, feature) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", feature)?;
        }
        Ok(())
    }
}

/// How a token's characters are encoded as Unicode category runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternType {
    /// Consecutive characters of the same category collapse to one entry.
    RepeatsMerged,
    /// One category entry per character.
    OnePerChar,
}

/// Per-token feature extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenExtractor {
    CoveredText,
    CharPattern(PatternType),
    PartOfSpeech,
    TimeWordType,
}

impl TokenExtractor {
    /// Feature name used when the extractor runs inside a bag.
    pub fn bag_name(self) -> &'static str {
        match self {
            TokenExtractor::CoveredText => "BAG_TEXT",
            TokenExtractor::CharPattern(PatternType::RepeatsMerged) => "BAG_CHAR_PATTERN_MERGED",
            TokenExtractor::CharPattern(PatternType::OnePerChar) => "BAG_CHAR_PATTERN",
            TokenExtractor::PartOfSpeech => "BAG_POS",
            TokenExtractor::TimeWordType => "BAG_TIME_WORD_TYPE",
        }
    }

    /// Value for `token`, if the extractor produces one.
    pub fn extract(self, token: &Token, lexicon: &TimeWordLexicon) -> Option<String> {
        match self {
            TokenExtractor::CoveredText => Some(token.text.clone()),
            TokenExtractor::CharPattern(kind) => {
                if token.text.is_empty() {
                    None
                } else {
                    Some(char_category_pattern(&token.text, kind))
                }
            }
            TokenExtractor::PartOfSpeech => token.pos.clone(),
            TokenExtractor::TimeWordType => lexicon.category(&token.text).map(str::to_string),
        }
    }
}

/// A bag of extractors applied to every covered token, token by token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBag {
    extractors: Vec<TokenExtractor>,
}

impl TokenBag {
    pub fn new(extractors: Vec<TokenExtractor>) -> Self {
        Self { extractors }
    }

    /// Covered text, both character patterns and part of speech.
    pub fn context() -> Self {
        Self::new(vec![
            TokenExtractor::CoveredText,
            TokenExtractor::CharPattern(PatternType::RepeatsMerged),
            TokenExtractor::CharPattern(PatternType::OnePerChar),
            TokenExtractor::PartOfSpeech,
        ])
    }

    /// Lexicon category of each covered time word.
    pub fn time_word_types() -> Self {
        Self::new(vec![TokenExtractor::TimeWordType])
    }

    pub fn extract<'a>(
        &'a self,
        tokens: &'a [Token],
        lexicon: &'a TimeWordLexicon,
    ) -> impl Iterator<Item = Feature> + 'a {
        tokens.iter().flat_map(move |token| {
            self.extractors.iter().filter_map(move |extractor| {
                extractor
                    .extract(token, lexicon)
                    .map(|value| Feature::with_value(extractor.bag_name(), value))
            })
        })
    }
}

/// Builds the feature vector of a node.
#[derive(Debug, Clone)]
pub struct FeatureComposer {
    lexicon: Arc<TimeWordLexicon>,
    leaf_bag: TokenBag,
    context_bag: TokenBag,
}

impl FeatureComposer {
    pub fn new(lexicon: Arc<TimeWordLexicon>) -> Self {
        Self {
            lexicon,
            leaf_bag: TokenBag::time_word_types(),
            context_bag: TokenBag::context(),
        }
    }

    pub fn lexicon(&self) -> &TimeWordLexicon {
        &self.lexicon
    }

    /// Features of `id`, given the category assigned to its parent and
    /// the tokens the node covers.
    pub fn compose(
        &self,
        tree: &ParseTree,
        id: NodeId,
        parent_category: Category,
        covered: &[Token],
    ) -> TimexResult<FeatureVector> {
        let node = tree.get(id).ok_or_else(|| TimexError::FeatureExtraction {
            message: format!("node {} is not part of the tree", id.index()),
        })?;
        let parent = tree.parent(id).ok_or_else(|| TimexError::FeatureExtraction {
            message: format!("node {} ({}) has no parent", id.index(), node.label()),
        })?;

        let mut features = FeatureVector::new();
        if tree.is_top_child(id) {
            features.push(Feature::indicator("IS_ROOT"));
        }
        features.push(Feature::with_value("NODE_LABEL", node.label()));
        features.push(Feature::with_value("PARENT_LABEL", parent.label()));
        features.push(Feature::with_value("PARENT_CAT", parent_category.label()));

        if node.is_leaf() {
            features.push(Feature::indicator("IS_LEAF"));
            features.extend(self.leaf_bag.extract(covered, &self.lexicon));
        } else {
            let mut production = Vec::with_capacity(node.children().len());
            for child in node.children() {
                let label = tree[*child].label();
                features.push(Feature::with_value("CHILD_BAG", label));
                production.push(label);
            }
            features.push(Feature::with_value("PRODUCTION", production.join("_")));
        }

        features.extend(self.context_bag.extract(covered, &self.lexicon));
        Ok(features)
    }
}

/// Unicode general-category pattern of `text`.
///
/// Categories use their two-letter abbreviations (`Lu`, `Ll`, `Nd`, ...).
pub fn char_category_pattern(text: &str, kind: PatternType) -> String {
    let mut out = String::new();
    let mut previous: Option<&'static str> = None;
    for ch in text.chars() {
        let category = char_category(ch);
        if kind == PatternType::RepeatsMerged && previous == Some(category) {
            continue;
        }
        out.push_str(category);
        previous = Some(category);
    }
    out
}

/// Two-letter Unicode general category of `ch`.
fn char_category(ch: char) -> &'static str {
    match get_general_category(ch) {
        GeneralCategory::UppercaseLetter => "Lu",
        GeneralCategory::LowercaseLetter => "Ll",
        GeneralCategory::TitlecaseLetter => "Lt",
        GeneralCategory::ModifierLetter => "Lm",
        GeneralCategory::OtherLetter => "Lo",
        GeneralCategory::NonspacingMark => "Mn",
        GeneralCategory::SpacingMark => "Mc",
        GeneralCategory::EnclosingMark => "Me",
        GeneralCategory::DecimalNumber => "Nd",
        GeneralCategory::LetterNumber => "Nl",
        GeneralCategory::OtherNumber => "No",
        GeneralCategory::ConnectorPunctuation => "Pc",
        GeneralCategory::DashPunctuation => "Pd",
        GeneralCategory::OpenPunctuation => "Ps",
        GeneralCategory::ClosePunctuation => "Pe",
        GeneralCategory::InitialPunctuation => "Pi",
        GeneralCategory::FinalPunctuation => "Pf",
        GeneralCategory::OtherPunctuation => "Po",
        GeneralCategory::MathSymbol => "Sm",
        GeneralCategory::CurrencySymbol => "Sc",
        GeneralCategory::ModifierSymbol => "Sk",
        GeneralCategory::OtherSymbol => "So",
        GeneralCategory::SpaceSeparator => "Zs",
        GeneralCategory::LineSeparator => "Zl",
        GeneralCategory::ParagraphSeparator => "Zp",
        GeneralCategory::Control => "Cc",
        GeneralCategory::Format => "Cf",
        GeneralCategory::Surrogate => "Cs",
        GeneralCategory::PrivateUse => "Co",
        _ => "Cn",
    }
}
