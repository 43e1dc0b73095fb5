//! The time-word lexicon.
//!
//! A static table of `<category> <word>` lines. Its key set is the set of
//! time words used both for leaf features and for the pruning heuristic of
//! the span resolver.

use crate::errors::{TimexError, TimexResult};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Word list compiled into the crate.
const BUNDLED_WORD_TYPES: &str = include_str!("../resources/time_word_types.txt");

static BUNDLED: OnceCell<Arc<TimeWordLexicon>> = OnceCell::new();

/// Immutable `word -> category` map. Words are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeWordLexicon {
    word_types: BTreeMap<String, String>,
}

impl TimeWordLexicon {
    /// Parse lexicon lines of the form `<category> <word>`.
    ///
    /// Every line must split on whitespace into exactly two fields.
    /// A word listed twice keeps its last category.
    ///
    /// ```
    /// use layered_timex::TimeWordLexicon;
    ///
    /// let lexicon = TimeWordLexicon::parse("WEEKDAY monday\nUNIT days").unwrap();
    /// assert_eq!(lexicon.category("Monday"), Some("WEEKDAY"));
    /// assert!(lexicon.is_time_word("DAYS"));
    /// assert!(!lexicon.is_time_word("pain"));
    /// ```
    pub fn parse(source: &str) -> TimexResult<Self> {
        let mut word_types = BTreeMap::new();
        for (idx, line) in source.lines().enumerate() {
            // leading and trailing whitespace is not a field
            let fields: Vec<&str> = line.split_whitespace().collect();
            let (category, word) = match fields.as_slice() {
                [category, word] => (*category, *word),
                _ => {
                    return Err(TimexError::MalformedLexiconEntry {
                        line_number: idx + 1,
                        line: line.to_string(),
                    })
                }
            };
            let word = word.to_lowercase();
            if let Some(previous) = word_types.insert(word.clone(), category.to_string()) {
                if previous != category {
                    warn!(%word, %previous, %category, "time word redefined");
                }
            }
        }
        Ok(Self { word_types })
    }

    /// Load a lexicon resource from disk.
    pub fn load(path: &Path) -> TimexResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| TimexError::io(path.display(), e))?;
        let lexicon = Self::parse(&content)?;
        info!(path = %path.display(), entries = lexicon.len(), "loaded time-word lexicon");
        Ok(lexicon)
    }

    /// The lexicon shipped with the crate, parsed once per process.
    pub fn bundled() -> TimexResult<Arc<Self>> {
        BUNDLED
            .get_or_try_init(|| {
                let lexicon = Self::parse(BUNDLED_WORD_TYPES)?;
                info!(entries = lexicon.len(), "loaded bundled time-word lexicon");
                Ok(Arc::new(lexicon))
            })
            .map(Arc::clone)
    }

    /// Category of `word`, compared case-insensitively.
    pub fn category(&self, word: &str) -> Option<&str> {
        self.word_types.get(&word.to_lowercase()).map(String::as_str)
    }

    pub fn is_time_word(&self, word: &str) -> bool {
        self.word_types.contains_key(&word.to_lowercase())
    }

    /// Time words in lexical order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.word_types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.word_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_types.is_empty()
    }
}
