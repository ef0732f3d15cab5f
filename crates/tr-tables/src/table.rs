//! Tables and their results.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use tr_dice::RollSpec;

use crate::error::{TableError, TableResult};
use crate::link::{LinkToken, classify, scan};

/// The sentinel roll meaning "one roll over the table's own results".
pub const LENGTH_ROLL: &str = "length";

/// A table record as authored in a table file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// Unique table name.
    #[serde(rename = "table-name")]
    pub name: String,
    /// Dice notation, or `length`.
    pub roll: String,
    /// Optional grouping label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Result text keyed by roll value.
    pub results: BTreeMap<i64, String>,
}

/// How a table is rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRoll {
    /// `1d{N}` where `N` is the number of results.
    Length,
    /// Explicit dice notation.
    Notation(RollSpec),
}

impl fmt::Display for TableRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => write!(f, "{LENGTH_ROLL}"),
            Self::Notation(spec) => write!(f, "{spec}"),
        }
    }
}

impl TableRoll {
    /// Parse a table's `roll` field.
    pub fn parse(text: &str) -> TableResult<Self> {
        if text.trim().eq_ignore_ascii_case(LENGTH_ROLL) {
            Ok(Self::Length)
        } else {
            Ok(Self::Notation(tr_dice::parse(text)?))
        }
    }
}

/// A link found in result text, with where it sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedLink {
    /// Byte range of the link in the raw text, brackets included.
    pub span: Range<usize>,
    /// The classified link, or why classification failed.
    pub parsed: Result<LinkToken, TableError>,
}

/// The text of one result, with its links parsed once up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultText {
    raw: String,
    links: Vec<EmbeddedLink>,
}

impl ResultText {
    /// Parse `raw` for links.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let links = scan(&raw)
            .into_iter()
            .map(|link| EmbeddedLink {
                span: link.span,
                parsed: classify(link.text),
            })
            .collect();
        Self { raw, links }
    }

    /// The text as authored.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Every bracketed span, recognized or not, in left-to-right order.
    pub fn embedded(&self) -> &[EmbeddedLink] {
        &self.links
    }

    /// The recognized links, in left-to-right order.
    pub fn links(&self) -> impl Iterator<Item = &LinkToken> {
        self.links.iter().filter_map(|l| l.parsed.as_ref().ok())
    }

    /// True if the text contains no bracketed spans at all.
    pub fn is_plain(&self) -> bool {
        self.links.is_empty()
    }
}

impl fmt::Display for ResultText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A named random table.
///
/// Immutable once built; share it through a [`crate::TableStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    group: Option<String>,
    roll: TableRoll,
    results: BTreeMap<i64, ResultText>,
}

impl Table {
    /// Build a table from an authored record, validating it.
    pub fn from_def(def: TableDef) -> TableResult<Self> {
        let invalid = |reason: String| TableError::InvalidTable {
            name: def.name.clone(),
            reason,
        };

        if def.name.trim().is_empty() {
            return Err(invalid("table name is empty".into()));
        }
        let roll = TableRoll::parse(&def.roll)
            .map_err(|e| invalid(format!("roll must be dice notation or 'length': {e}")))?;
        if def.results.is_empty() {
            return Err(invalid("table has no results".into()));
        }
        if let Some(key) = def.results.keys().find(|k| **k < 1) {
            return Err(invalid(format!("result key {key} is not a positive integer")));
        }

        let results = def
            .results
            .into_iter()
            .map(|(key, text)| (key, ResultText::new(text)))
            .collect();

        Ok(Self {
            name: def.name.trim().to_string(),
            group: def.group.filter(|g| !g.trim().is_empty()),
            roll,
            results,
        })
    }

    /// Convenience constructor for code-built tables.
    pub fn new<K, V>(name: &str, roll: &str, results: impl IntoIterator<Item = (K, V)>) -> TableResult<Self>
    where
        K: Into<i64>,
        V: Into<String>,
    {
        Self::from_def(TableDef {
            name: name.to_string(),
            roll: roll.to_string(),
            group: None,
            results: results
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        })
    }

    /// Set the group label.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// The table's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The table's group, if any.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The roll as authored.
    pub fn roll(&self) -> TableRoll {
        self.roll
    }

    /// The roll to use for this table, with `length` turned into `1d{N}`.
    pub fn effective_roll(&self) -> TableResult<RollSpec> {
        match self.roll {
            TableRoll::Length => {
                let sides = u32::try_from(self.results.len()).unwrap_or(u32::MAX);
                Ok(RollSpec::new(1, sides)?)
            }
            TableRoll::Notation(spec) => Ok(spec),
        }
    }

    /// All results in key order.
    pub fn results(&self) -> &BTreeMap<i64, ResultText> {
        &self.results
    }

    /// The result for `key`, if present.
    pub fn result(&self, key: i64) -> Option<&ResultText> {
        self.results.get(&key)
    }

    /// The result for `key`, or [`TableError::UnknownResultKey`].
    pub fn get_result(&self, key: i64) -> TableResult<&ResultText> {
        self.result(key).ok_or_else(|| TableError::UnknownResultKey {
            table: self.name.clone(),
            key,
        })
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True if the table has no results. Validated tables never are.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Turn the table back into an authored record.
    pub fn to_def(&self) -> TableDef {
        TableDef {
            name: self.name.clone(),
            roll: self.roll.to_string(),
            group: self.group.clone(),
            results: self
                .results
                .iter()
                .map(|(k, v)| (*k, v.raw().to_string()))
                .collect(),
        }
    }
}
