//! Constituency parse trees stored as an arena.
//!
//! Nodes are addressed by [`NodeId`]. The tree owns every node; children are
//! ordered id lists and the parent link is an optional id used for lookup
//! only. Trees are produced upstream by a parser; [`BracketedReader`] turns
//! Penn-Treebank bracket notation into a tree whose spans are aligned to the
//! segment text.

use crate::errors::{TimexError, TimexResult};
use crate::span::Span;
use std::ops::Index;

/// Index of a node inside its [`ParseTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single constituent.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNode {
    label: String,
    leaf: bool,
    span: Span,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl ParseNode {
    /// Syntactic category, e.g. `NP` or `NNP`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// An arena-backed constituency tree with a single root.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTree {
    nodes: Vec<ParseNode>,
}

impl ParseTree {
    /// Start a tree whose root has `label` and covers `span`.
    pub fn builder(label: impl Into<String>, span: Span) -> TreeBuilder {
        TreeBuilder {
            nodes: vec![ParseNode {
                label: label.into(),
                leaf: false,
                span,
                children: Vec::new(),
                parent: None,
            }],
        }
    }

    /// Read a single bracketed tree whose words appear in `text` in order.
    ///
    /// ```
    /// use layered_timex::ParseTree;
    ///
    /// let text = "Seen Monday.";
    /// let tree = ParseTree::from_bracketed(text, "(TOP (S (VBN Seen) (NNP Monday) (. .)))").unwrap();
    /// let top = tree.top_child().unwrap();
    /// assert_eq!(tree[top].label(), "S");
    /// assert_eq!(tree[top].span().text(text), Some("Seen Monday."));
    /// ```
    pub fn from_bracketed(text: &str, bracketed: &str) -> TimexResult<ParseTree> {
        BracketedReader::new(text).read(bracketed)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The root's first child, where time-mention resolution starts.
    pub fn top_child(&self) -> Option<NodeId> {
        self.nodes[0].children.first().copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&ParseNode> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<&ParseNode> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    /// Returns true if `id`'s parent is the root of the tree.
    pub fn is_top_child(&self, id: NodeId) -> bool {
        match self.get(id).and_then(|n| n.parent) {
            Some(parent) => self.nodes[parent.0].parent.is_none(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.leaf {
                out.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Every strict descendant of `id`, pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(id) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev().copied());
        }
        out
    }
}

impl Index<NodeId> for ParseTree {
    type Output = ParseNode;

    fn index(&self, id: NodeId) -> &ParseNode {
        &self.nodes[id.0]
    }
}

/// Incremental construction of a [`ParseTree`].
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<ParseNode>,
}

impl TreeBuilder {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a non-leaf constituent under `parent`.
    pub fn add_node(&mut self, parent: NodeId, label: impl Into<String>, span: Span) -> NodeId {
        self.push(parent, label.into(), span, false)
    }

    /// Append a leaf constituent under `parent`.
    pub fn add_leaf(&mut self, parent: NodeId, label: impl Into<String>, span: Span) -> NodeId {
        self.push(parent, label.into(), span, true)
    }

    fn push(&mut self, parent: NodeId, label: String, span: Span, leaf: bool) -> NodeId {
        debug_assert!(!self.nodes[parent.0].leaf, "leaf nodes cannot have children");
        debug_assert!(
            self.nodes[parent.0].span.covers(span),
            "child span {} outside parent span {}",
            span,
            self.nodes[parent.0].span
        );
        let id = NodeId(self.nodes.len());
        self.nodes.push(ParseNode {
            label,
            leaf,
            span,
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn build(self) -> ParseTree {
        ParseTree { nodes: self.nodes }
    }
}

/// Reads bracketed trees, aligning terminal words to a segment's text.
///
/// Words are located left to right starting after the previous tree's last
/// word, so several sentence trees of one segment can be read in sequence.
/// Preterminals `(TAG word)` become leaves labelled `TAG`. An unlabelled
/// outermost bracket is labelled `TOP`.
#[derive(Debug)]
pub struct BracketedReader<'t> {
    text: &'t str,
    /// Byte position in `text` after the last aligned word
    cursor: usize,
    /// The same position in characters
    offset: usize,
}

#[derive(Debug)]
enum Lexeme<'b> {
    Open(usize),
    Close(usize),
    Atom(usize, &'b str),
}

#[derive(Debug)]
struct Bracket<'b> {
    label: &'b str,
    word: Option<&'b str>,
    children: Vec<Bracket<'b>>,
}

impl<'t> BracketedReader<'t> {
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            cursor: 0,
            offset: 0,
        }
    }

    /// Character offset after the last aligned word.
    pub fn cursor(&self) -> usize {
        self.offset
    }

    pub fn read(&mut self, bracketed: &str) -> TimexResult<ParseTree> {
        let lexemes = lex(bracketed);
        let mut pos = 0;
        let bracket = parse_bracket(&lexemes, &mut pos)?;
        if let Some(extra) = lexemes.get(pos) {
            return Err(TimexError::TreeSyntax {
                position: lexeme_offset(extra),
                message: "trailing input after tree".to_string(),
            });
        }
        if bracket.word.is_some() {
            return Err(TimexError::TreeSyntax {
                position: 0,
                message: "tree root cannot be a terminal".to_string(),
            });
        }

        let mut nodes = Vec::new();
        let label = if bracket.label.is_empty() { "TOP" } else { bracket.label };
        self.insert(&mut nodes, &bracket, label, None)?;
        Ok(ParseTree { nodes })
    }

    fn insert(
        &mut self,
        nodes: &mut Vec<ParseNode>,
        bracket: &Bracket<'_>,
        label: &str,
        parent: Option<NodeId>,
    ) -> TimexResult<NodeId> {
        let id = NodeId(nodes.len());
        nodes.push(ParseNode {
            label: label.to_string(),
            leaf: bracket.word.is_some(),
            span: Span::new(self.offset, self.offset),
            children: Vec::new(),
            parent,
        });

        let span = match bracket.word {
            Some(word) => self.align(word)?,
            None => {
                let mut children = Vec::with_capacity(bracket.children.len());
                for child in &bracket.children {
                    children.push(self.insert(nodes, child, child.label, Some(id))?);
                }
                let (first, last) = match (children.first(), children.last()) {
                    (Some(first), Some(last)) => (*first, *last),
                    _ => {
                        return Err(TimexError::TreeSyntax {
                            position: self.offset,
                            message: format!("constituent {} has no children", label),
                        })
                    }
                };
                let span = Span::new(nodes[first.0].span.begin, nodes[last.0].span.end);
                nodes[id.0].children = children;
                span
            }
        };
        nodes[id.0].span = span;
        Ok(id)
    }

    fn align(&mut self, word: &str) -> TimexResult<Span> {
        let surface = unescape(word);
        let rest = self.text.get(self.cursor..).unwrap_or("");
        match rest.find(surface) {
            Some(skip) => {
                let begin = self.offset + rest[..skip].chars().count();
                let end = begin + surface.chars().count();
                self.cursor += skip + surface.len();
                self.offset = end;
                Ok(Span::new(begin, end))
            }
            None => Err(TimexError::TreeSyntax {
                position: self.offset,
                message: format!("word {:?} not found in text after offset {}", surface, self.offset),
            }),
        }
    }
}

fn unescape(word: &str) -> &str {
    match word {
        "-LRB-" => "(",
        "-RRB-" => ")",
        "-LSB-" => "[",
        "-RSB-" => "]",
        "-LCB-" => "{",
        "-RCB-" => "}",
        other => other,
    }
}

fn lex(input: &str) -> Vec<Lexeme<'_>> {
    let mut out = Vec::new();
    let mut atom_start: Option<usize> = None;
    for (idx, ch) in input.char_indices() {
        if ch == '(' || ch == ')' || ch.is_whitespace() {
            if let Some(start) = atom_start.take() {
                out.push(Lexeme::Atom(start, &input[start..idx]));
            }
            match ch {
                '(' => out.push(Lexeme::Open(idx)),
                ')' => out.push(Lexeme::Close(idx)),
                _ => {}
            }
        } else if atom_start.is_none() {
            atom_start = Some(idx);
        }
    }
    if let Some(start) = atom_start {
        out.push(Lexeme::Atom(start, &input[start..]));
    }
    out
}

fn lexeme_offset(lexeme: &Lexeme<'_>) -> usize {
    match lexeme {
        Lexeme::Open(at) | Lexeme::Close(at) | Lexeme::Atom(at, _) => *at,
    }
}

fn parse_bracket<'b>(lexemes: &[Lexeme<'b>], pos: &mut usize) -> TimexResult<Bracket<'b>> {
    let open_at = match lexemes.get(*pos) {
        Some(Lexeme::Open(at)) => *at,
        Some(other) => {
            return Err(TimexError::TreeSyntax {
                position: lexeme_offset(other),
                message: "expected '('".to_string(),
            })
        }
        None => {
            return Err(TimexError::TreeSyntax {
                position: 0,
                message: "empty tree".to_string(),
            })
        }
    };
    *pos += 1;

    let label = match lexemes.get(*pos) {
        Some(Lexeme::Atom(_, label)) => {
            *pos += 1;
            *label
        }
        _ => "",
    };

    let mut children = Vec::new();
    let mut word = None;
    loop {
        match lexemes.get(*pos) {
            Some(Lexeme::Close(_)) => {
                *pos += 1;
                break;
            }
            Some(Lexeme::Open(_)) => {
                if word.is_some() {
                    return Err(TimexError::TreeSyntax {
                        position: lexeme_offset(&lexemes[*pos]),
                        message: format!("terminal {} cannot have children", label),
                    });
                }
                children.push(parse_bracket(lexemes, pos)?);
            }
            Some(Lexeme::Atom(at, atom)) => {
                if word.is_some() || !children.is_empty() {
                    return Err(TimexError::TreeSyntax {
                        position: *at,
                        message: format!("unexpected word {:?} in {}", atom, label),
                    });
                }
                word = Some(*atom);
                *pos += 1;
            }
            None => {
                return Err(TimexError::TreeSyntax {
                    position: open_at,
                    message: "unbalanced '('".to_string(),
                })
            }
        }
    }

    Ok(Bracket {
        label,
        word,
        children,
    })
}
