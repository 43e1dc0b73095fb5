//! Text rendering of a segment with spans marked under its tokens.
//!
//! ```text
//! Pain  began  on  Monday  .
//!                  ╰────╯TimeMention { confidence: 0.92 }
//! ```

use crate::document::Segment;
use crate::sink::TimeMention;
use crate::span::Span;
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

/// A span to draw, as inclusive token indexes.
struct IncludedSpan {
    first_token: usize,
    last_token: usize,
    label: String,
}

pub struct SegmentDisplay<'a> {
    segment: &'a Segment,
    include_spans: Vec<IncludedSpan>,
}

impl<'a> std::fmt::Display for SegmentDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const SPACE_PADDING: usize = 2;
        let mut token_idx_to_start_display_char_idx = Vec::new();
        let mut token_idx_to_end_display_char_idx = Vec::new();
        let mut opening_line = String::new();
        {
            let mut is_first = true;
            for token in self.segment.tokens().tokens() {
                if is_first {
                    is_first = false;
                } else {
                    opening_line.extend(std::iter::repeat(' ').take(SPACE_PADDING));
                }

                token_idx_to_start_display_char_idx.push(UnicodeWidthStr::width(&*opening_line));
                write!(&mut opening_line, "{}", token.text)?;
                token_idx_to_end_display_char_idx.push(UnicodeWidthStr::width(&*opening_line));
            }
        }

        f.write_str(&opening_line)?;

        for included in self.include_spans.iter() {
            f.write_char('\n')?;

            let start_char_idx = token_idx_to_start_display_char_idx[included.first_token];
            for _ in 0..start_char_idx {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;

            let end_char_idx = token_idx_to_end_display_char_idx[included.last_token];
            let char_len = end_char_idx - start_char_idx;
            for _ in (start_char_idx + 1)..end_char_idx.saturating_sub(1) {
                f.write_char('─')?;
            }

            if char_len > 1 {
                f.write_char('╯')?;
            }

            f.write_str(&included.label)?;
        }

        Ok(())
    }
}

impl<'a> SegmentDisplay<'a> {
    pub fn new(segment: &'a Segment) -> Self {
        SegmentDisplay {
            segment,
            include_spans: Vec::new(),
        }
    }

    /// Mark `span` with `label`. Spans covering no token are skipped.
    pub fn include_span(&mut self, span: Span, label: impl Into<String>) {
        let tokens = self.segment.tokens().tokens();
        let first = tokens.iter().position(|t| span.covers(t.span));
        let last = tokens.iter().rposition(|t| span.covers(t.span));
        if let (Some(first_token), Some(last_token)) = (first, last) {
            self.include_spans.push(IncludedSpan {
                first_token,
                last_token,
                label: label.into(),
            });
        }
    }

    pub fn include_mentions(&mut self, mentions: &[TimeMention]) {
        for mention in mentions {
            self.include_span(
                mention.span,
                format!("TimeMention {{ confidence: {:.2} }}", mention.confidence),
            );
        }
    }

    pub fn include_gold(&mut self) {
        for gold in self.segment.gold() {
            self.include_span(*gold, "Gold");
        }
    }

    /// Takes self
    pub fn with_mentions(mut self, mentions: &[TimeMention]) -> Self {
        self.include_mentions(mentions);
        self
    }

    /// Takes self
    pub fn with_gold(mut self) -> Self {
        self.include_gold();
        self
    }
}
