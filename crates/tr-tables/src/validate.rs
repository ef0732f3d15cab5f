//! Validation of a loaded table store.
//!
//! Reports every problem instead of stopping at the first: links that do
//! not parse, links to tables that are not loaded, and results a table's
//! roll can never reach (or rolls that land on no result).

use std::fmt;
use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

use crate::link::LinkKind;
use crate::store::TableStore;
use crate::table::{Table, TableRoll};

/// Widest roll range that is checked value by value.
const MAX_CHECKED_RANGE: i64 = 10_000;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The table will misbehave when rolled.
    Error,
    /// Suspicious but resolvable.
    Warning,
}

/// A problem found in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// How bad it is.
    pub severity: Severity,
    /// Table the problem was found in.
    pub table: String,
    /// Result key, when the problem is inside one result.
    pub key: Option<i64>,
    /// Byte range inside the result text, when known.
    pub span: Option<Range<usize>>,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// An error about a whole table.
    pub fn error(table: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            table: table.to_string(),
            key: None,
            span: None,
            message: message.into(),
        }
    }

    /// A warning about a whole table.
    pub fn warning(table: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(table, message)
        }
    }

    /// Point the diagnostic at part of one result.
    pub fn at(mut self, key: i64, span: Range<usize>) -> Self {
        self.key = Some(key);
        self.span = Some(span);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match self.key {
            Some(key) => write!(f, "{prefix}: {} #{key}: {}", self.table, self.message),
            None => write!(f, "{prefix}: {}: {}", self.table, self.message),
        }
    }
}

/// Check every table in `store`.
pub fn check_store(store: &TableStore) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for table in store.all() {
        check_roll_coverage(table, &mut diagnostics);
        check_links(table, store, &mut diagnostics);
    }
    diagnostics
}

fn check_roll_coverage(table: &Table, diagnostics: &mut Vec<Diagnostic>) {
    let name = table.name();
    let Ok(spec) = table.effective_roll() else {
        return;
    };
    let label = match table.roll() {
        TableRoll::Length => format!("'length' roll ({spec})"),
        TableRoll::Notation(_) => format!("roll {spec}"),
    };
    let (min, max) = (spec.min_value(), spec.max_value());

    if max - min <= MAX_CHECKED_RANGE {
        let missing: Vec<i64> = (min..=max).filter(|k| table.result(*k).is_none()).collect();
        if !missing.is_empty() {
            diagnostics.push(Diagnostic::warning(
                name,
                format!("{label} can land on missing result(s) {}", list(&missing)),
            ));
        }
    }

    let unreachable: Vec<i64> = table
        .results()
        .keys()
        .copied()
        .filter(|k| *k < min || *k > max)
        .collect();
    if !unreachable.is_empty() {
        diagnostics.push(Diagnostic::warning(
            name,
            format!("{label} can never reach result(s) {}", list(&unreachable)),
        ));
    }
}

fn check_links(table: &Table, store: &TableStore, diagnostics: &mut Vec<Diagnostic>) {
    for (key, result) in table.results() {
        for link in result.embedded() {
            match &link.parsed {
                Err(e) => diagnostics.push(
                    Diagnostic::error(table.name(), e.to_string()).at(*key, link.span.clone()),
                ),
                Ok(token) => {
                    if let LinkKind::TableReference { table: target } = token.kind()
                        && !store.contains(target)
                    {
                        diagnostics.push(
                            Diagnostic::error(
                                table.name(),
                                format!("linked table '{target}' is not loaded"),
                            )
                            .at(*key, link.span.clone()),
                        );
                    }
                }
            }
        }
    }
}

fn list(keys: &[i64]) -> String {
    const SHOWN: usize = 8;
    let mut parts: Vec<String> = keys.iter().take(SHOWN).map(i64::to_string).collect();
    if keys.len() > SHOWN {
        parts.push(format!("and {} more", keys.len() - SHOWN));
    }
    parts.join(", ")
}

/// True if any diagnostic is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

/// Render diagnostics for the terminal.
///
/// Diagnostics that point into a result are drawn with `ariadne` against
/// that result's text; the rest are printed on one line each.
pub fn render_diagnostics(store: &TableStore, diagnostics: &[Diagnostic]) -> String {
    let mut output = String::new();

    for diag in diagnostics {
        let located = diag.key.zip(diag.span.clone()).and_then(|(key, span)| {
            let text = store.get(&diag.table)?.result(key)?.raw();
            text.get(span.clone())?;
            Some((key, span, text))
        });

        match located.and_then(|(key, span, text)| render_located(diag, key, span, text)) {
            Some(report) => output.push_str(&report),
            None => output.push_str(&format!("{diag}\n")),
        }
    }

    output
}

/// Draw one diagnostic against its result text, or `None` if ariadne fails.
fn render_located(diag: &Diagnostic, key: i64, span: Range<usize>, text: &str) -> Option<String> {
    let (kind, color) = match diag.severity {
        Severity::Error => (ReportKind::Error, Color::Red),
        Severity::Warning => (ReportKind::Warning, Color::Yellow),
    };
    let id = format!("{} #{key}", diag.table);
    let mut buf = Vec::new();

    Report::build(kind, (id.as_str(), span.clone()))
        .with_config(Config::default().with_index_type(IndexType::Byte))
        .with_message(&diag.message)
        .with_label(
            Label::new((id.as_str(), span))
                .with_message(&diag.message)
                .with_color(color),
        )
        .finish()
        .write((id.as_str(), Source::from(text)), &mut buf)
        .ok()?;

    String::from_utf8(buf).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TableStore {
        let room = Table::new(
            "Room",
            "length",
            [
                (1, "A chest with [1@Loot]"),
                (2, "A goblin holding [1@Goblins]"),
                (3, "Dust [1f4]"),
            ],
        )
        .unwrap();
        let loot = Table::new("Loot", "length", [(1, "A sword"), (2, "A shield")]).unwrap();
        [room, loot].into_iter().collect()
    }

    #[test]
    fn clean_store_has_no_diagnostics() {
        let loot = Table::new("Loot", "length", [(1, "A sword"), (2, "A shield")]).unwrap();
        let store: TableStore = [loot].into_iter().collect();
        assert!(check_store(&store).is_empty());
    }

    #[test]
    fn reports_every_broken_link() {
        let diags = check_store(&store());
        assert_eq!(diags.len(), 2);
        assert!(has_errors(&diags));

        assert_eq!(diags[0].key, Some(2));
        assert!(diags[0].message.contains("'Goblins'"));
        assert_eq!(diags[0].span, Some(17..28));

        assert_eq!(diags[1].key, Some(3));
        assert!(diags[1].message.contains("unrecognized link format"));
    }

    #[test]
    fn length_table_with_gaps() {
        let table = Table::new("Gappy", "length", [(1, "a"), (3, "c")]).unwrap();
        let store: TableStore = [table].into_iter().collect();
        let diags = check_store(&store);
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.severity == Severity::Warning));
        assert!(diags[0].message.contains("'length' roll (1d2)"));
        assert!(diags[0].message.contains("missing result(s) 2"));
        assert!(diags[1].message.contains("never reach result(s) 3"));
        assert!(!has_errors(&diags));
    }

    #[test]
    fn length_table_with_high_keys_is_unreachable() {
        let table = Table::new("Hoard", "length", [(5, "gold"), (6, "gems")]).unwrap();
        let store: TableStore = [table].into_iter().collect();
        let diags = check_store(&store);
        assert_eq!(diags.len(), 2);
        assert!(diags[0].message.contains("missing result(s) 1, 2"));
        assert!(diags[1].message.contains("never reach result(s) 5, 6"));
    }

    #[test]
    fn notation_roll_coverage() {
        let table = Table::new("Weather", "2d6", (2..=11).map(|k| (k, "fine")).chain([(20, "odd")]))
            .unwrap();
        let store: TableStore = [table].into_iter().collect();
        let diags = check_store(&store);
        assert_eq!(diags.len(), 2);
        assert!(diags[0].message.contains("missing result(s) 12"));
        assert!(diags[1].message.contains("never reach result(s) 20"));
    }

    #[test]
    fn long_key_lists_are_truncated() {
        assert_eq!(list(&[1, 2, 3]), "1, 2, 3");
        assert_eq!(
            list(&(1..=10).collect::<Vec<_>>()),
            "1, 2, 3, 4, 5, 6, 7, 8, and 2 more"
        );
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error("Room", "linked table 'Goblins' is not loaded").at(2, 0..1);
        assert_eq!(
            d.to_string(),
            "error: Room #2: linked table 'Goblins' is not loaded"
        );
        let d = Diagnostic::warning("Gappy", "gaps");
        assert_eq!(d.to_string(), "warning: Gappy: gaps");
    }

    #[test]
    fn render_produces_output() {
        let store = store();
        let diags = check_store(&store);
        let output = render_diagnostics(&store, &diags);
        assert!(output.contains("linked table 'Goblins' is not loaded"));
        assert!(output.contains("Room #2"));
    }

    #[test]
    fn render_falls_back_to_plain_lines() {
        let diags = vec![Diagnostic::warning("Gone", "table vanished")];
        let output = render_diagnostics(&TableStore::new(), &diags);
        assert_eq!(output, "warning: Gone: table vanished\n");
    }

    #[test]
    fn render_out_of_range_span_falls_back() {
        let diags = vec![
            Diagnostic::error("Room", "bad span").at(2, 100..200),
            Diagnostic::error("Room", "linked table 'Goblins' is not loaded").at(2, 17..28),
        ];
        let output = render_diagnostics(&store(), &diags);
        assert!(output.starts_with("error: Room #2: bad span\n"));
        assert!(output.contains("linked table 'Goblins' is not loaded"));
        assert_eq!(output.matches("bad span").count(), 1);
    }
}
