//! Link extraction and classification.
//!
//! A result's text may embed bracketed links:
//!
//! - `[1d6]` or `[3]`: a bare roll, replaced by its value
//! - `[2@Goblins]` or `[1d4@Goblins]`: roll that many times on another table
//!
//! Extraction is a single left-to-right pass. An opening `[` starts a
//! candidate; a later `[` replaces it; the first `]` closes whichever `[`
//! is open. Unmatched brackets are ignored.

use std::fmt;
use std::ops::Range;

use tr_dice::RollAmount;

use crate::error::{TableError, TableResult};

/// A bracketed span found in result text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink<'a> {
    /// The text between the brackets.
    pub text: &'a str,
    /// Byte range of the link in the source, brackets included.
    pub span: Range<usize>,
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Outside,
    Inside { open: usize },
}

/// Find every bracketed span in `text`, in order of appearance.
pub fn scan(text: &str) -> Vec<RawLink<'_>> {
    let mut links = Vec::new();
    let mut state = ScanState::Outside;

    for (pos, ch) in text.char_indices() {
        state = match (state, ch) {
            (_, '[') => ScanState::Inside { open: pos },
            (ScanState::Inside { open }, ']') => {
                links.push(RawLink {
                    text: &text[open + 1..pos],
                    span: open..pos + 1,
                });
                ScanState::Outside
            }
            (state, _) => state,
        };
    }

    links
}

/// The bracketed substrings of `text`, delimiters stripped.
pub fn extract(text: &str) -> Vec<&str> {
    scan(text).into_iter().map(|link| link.text).collect()
}

/// What a link does when resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// A standalone roll replaced by its value.
    BareRoll,
    /// Roll on another table a number of times.
    TableReference {
        /// Name of the referenced table.
        table: String,
    },
}

/// A classified link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkToken {
    source_text: String,
    kind: LinkKind,
    roll_notation: String,
    amount: RollAmount,
}

impl LinkToken {
    /// The link text between the brackets, exactly as written.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Bare roll or table reference.
    pub fn kind(&self) -> &LinkKind {
        &self.kind
    }

    /// The roll portion as written: dice notation or a digit string.
    pub fn roll_notation(&self) -> &str {
        &self.roll_notation
    }

    /// The parsed roll portion.
    pub fn amount(&self) -> &RollAmount {
        &self.amount
    }

    /// The referenced table, for table references.
    pub fn table_name(&self) -> Option<&str> {
        match &self.kind {
            LinkKind::BareRoll => None,
            LinkKind::TableReference { table } => Some(table),
        }
    }
}

impl fmt::Display for LinkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.source_text)
    }
}

/// Classify the text of one link.
///
/// Text containing `@` is split at the first `@` into a roll portion and a
/// table name. Anything else must be dice notation or a plain count.
pub fn classify(raw: &str) -> TableResult<LinkToken> {
    let unrecognized = || TableError::UnrecognizedLinkFormat(raw.to_string());

    match raw.split_once('@') {
        Some((roll, table)) => {
            let roll = roll.trim();
            let table = table.trim();
            if table.is_empty() {
                return Err(unrecognized());
            }
            let amount: RollAmount = roll.parse().map_err(|_| unrecognized())?;
            Ok(LinkToken {
                source_text: raw.to_string(),
                kind: LinkKind::TableReference {
                    table: table.to_string(),
                },
                roll_notation: roll.to_string(),
                amount,
            })
        }
        None => {
            let amount: RollAmount = raw.parse().map_err(|_| unrecognized())?;
            Ok(LinkToken {
                source_text: raw.to_string(),
                kind: LinkKind::BareRoll,
                roll_notation: raw.trim().to_string(),
                amount,
            })
        }
    }
}
