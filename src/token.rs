//! The token layer: covered text and part-of-speech per token.

use crate::errors::{TimexError, TimexResult};
use crate::span::Span;
use crate::tree::ParseTree;
use serde::{Deserialize, Serialize};

/// Smallest covered unit of a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub span: Span,
    /// Part-of-speech tag, when a tagger has run.
    #[serde(default)]
    pub pos: Option<String>,
}

impl Token {
    pub fn new(text: impl Into<String>, span: Span, pos: Option<&str>) -> Self {
        Self {
            text: text.into(),
            span,
            pos: pos.map(str::to_string),
        }
    }
}

/// Non-overlapping tokens of one segment, ordered by offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenLayer {
    tokens: Vec<Token>,
}

impl TokenLayer {
    /// Sort `tokens` by offset. Overlapping tokens are rejected.
    pub fn new(mut tokens: Vec<Token>) -> TimexResult<Self> {
        tokens.sort_by_key(|t| t.span);
        if let Some(pair) = tokens.windows(2).find(|w| w[1].span.begin < w[0].span.end) {
            return Err(TimexError::OverlappingTokens {
                first: pair[0].span,
                second: pair[1].span,
            });
        }
        Ok(Self { tokens })
    }

    /// One token per tree leaf, tagged with the leaf's label.
    pub fn from_tree_leaves(text: &str, trees: &[ParseTree]) -> TimexResult<Self> {
        let tokens = trees
            .iter()
            .flat_map(|tree| {
                tree.leaves().into_iter().map(move |id| {
                    let node = &tree[id];
                    let surface = node.span().text(text).unwrap_or_default();
                    Token::new(surface, node.span(), Some(node.label()))
                })
            })
            .collect();
        Self::new(tokens)
    }

    /// Tokens whose span lies inside `span`, in text order.
    ///
    /// Relies on the tokens being sorted and non-overlapping.
    pub fn covered(&self, span: Span) -> &[Token] {
        let start = self.tokens.partition_point(|t| t.span.begin < span.begin);
        let len = self.tokens[start..]
            .iter()
            .take_while(|t| t.span.end <= span.end)
            .count();
        &self.tokens[start..start + len]
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> TokenLayer {
        TokenLayer::new(vec![
            Token::new("on", Span::new(5, 7), Some("IN")),
            Token::new("Seen", Span::new(0, 4), Some("VBN")),
            Token::new("Monday", Span::new(8, 14), Some("NNP")),
        ])
        .unwrap()
    }

    #[test]
    fn tokens_are_sorted_by_offset() {
        let layer = layer();
        let texts: Vec<&str> = layer.tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Seen", "on", "Monday"]);
    }

    #[test]
    fn overlapping_tokens_are_rejected() {
        let result = TokenLayer::new(vec![
            Token::new("Monday", Span::new(8, 14), None),
            Token::new("on Mon", Span::new(5, 11), None),
        ]);
        match result {
            Err(TimexError::OverlappingTokens { first, second }) => {
                assert_eq!(first, Span::new(5, 11));
                assert_eq!(second, Span::new(8, 14));
            }
            other => panic!("expected overlap error, got {:?}", other),
        }

        let touching = TokenLayer::new(vec![
            Token::new("a", Span::new(0, 1), None),
            Token::new("b", Span::new(1, 2), None),
        ]);
        assert_eq!(touching.unwrap().len(), 2);
    }

    #[test]
    fn covered_requires_full_containment() {
        let layer = layer();
        let texts = |span| -> Vec<String> {
            layer.covered(span).iter().map(|t| t.text.clone()).collect()
        };
        assert_eq!(texts(Span::new(0, 14)), vec!["Seen", "on", "Monday"]);
        assert_eq!(texts(Span::new(5, 14)), vec!["on", "Monday"]);
        assert_eq!(texts(Span::new(6, 14)), vec!["Monday"]);
        assert_eq!(texts(Span::new(0, 13)), vec!["Seen", "on"]);
        assert!(texts(Span::new(15, 20)).is_empty());
    }

    #[test]
    fn leaves_become_tagged_tokens() {
        let text = "Seen on Monday";
        let tree = ParseTree::from_bracketed(
            text,
            "(TOP (S (VBN Seen) (PP (IN on) (NP (NNP Monday)))))",
        )
        .unwrap();
        let layer = TokenLayer::from_tree_leaves(text, &[tree]).unwrap();
        assert_eq!(layer.len(), 3);
        assert_eq!(layer.tokens()[2], Token::new("Monday", Span::new(8, 14), Some("NNP")));
    }
}
