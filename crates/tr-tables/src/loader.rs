//! Loading table definitions from YAML and JSON files.
//!
//! A file holds one table record, a list of records, or a mapping of
//! arbitrary keys to records. YAML files may also hold several `---`
//! separated documents, each laid out in any of those ways:
//!
//! ```yaml
//! table-name: Loot
//! roll: length
//! group: treasure
//! results:
//!   1: A sword
//!   2: A shield and [1d4] arrows
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{TableError, TableResult};
use crate::store::TableStore;
use crate::table::{Table, TableDef};
use crate::validate::Diagnostic;

/// File extensions the loader reads.
pub const TABLE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Key that marks a mapping as a single table record.
const NAME_KEY: &str = "table-name";

/// Parse table records from `source`, picking the format from `path`'s
/// extension.
pub fn parse_defs(path: &Path, source: &str) -> TableResult<Vec<TableDef>> {
    let parse_err = |message: String| TableError::Parse {
        path: path.display().to_string(),
        message,
    };

    match extension(path).as_deref() {
        Some("json") => json_defs(source).map_err(|e| parse_err(e.to_string())),
        Some("yaml" | "yml") => yaml_defs(source).map_err(|e| parse_err(e.to_string())),
        _ => Err(parse_err("unsupported file extension".into())),
    }
}

/// How the records in one file are laid out.
enum Layout {
    One,
    Many,
    Named,
}

fn json_defs(source: &str) -> Result<Vec<TableDef>, serde_json::Error> {
    use serde_json::Value;

    let value: Value = serde_json::from_str(source)?;
    let layout = match &value {
        Value::Array(_) => Layout::Many,
        Value::Object(map) if map.contains_key(NAME_KEY) => Layout::One,
        _ => Layout::Named,
    };
    Ok(match layout {
        Layout::One => vec![serde_json::from_value(value)?],
        Layout::Many => serde_json::from_value(value)?,
        Layout::Named => serde_json::from_value::<BTreeMap<String, TableDef>>(value)?
            .into_values()
            .collect(),
    })
}

fn yaml_defs(source: &str) -> Result<Vec<TableDef>, serde_yaml::Error> {
    let mut defs = Vec::new();
    for document in serde_yaml::Deserializer::from_str(source) {
        let value = serde_yaml::Value::deserialize(document)?;
        defs.extend(yaml_document_defs(value)?);
    }
    Ok(defs)
}

fn yaml_document_defs(value: serde_yaml::Value) -> Result<Vec<TableDef>, serde_yaml::Error> {
    use serde_yaml::Value;

    let layout = match &value {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(_) => Layout::Many,
        Value::Mapping(map) if map.contains_key(NAME_KEY) => Layout::One,
        _ => Layout::Named,
    };
    Ok(match layout {
        Layout::One => vec![serde_yaml::from_value(value)?],
        Layout::Many => serde_yaml::from_value(value)?,
        Layout::Named => serde_yaml::from_value::<BTreeMap<String, TableDef>>(value)?
            .into_values()
            .collect(),
    })
}

/// Read table records from one file.
pub fn load_file(path: &Path) -> TableResult<Vec<TableDef>> {
    let source = std::fs::read_to_string(path).map_err(|e| TableError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let defs = parse_defs(path, &source)?;
    debug!(path = %path.display(), tables = defs.len(), "loaded table file");
    Ok(defs)
}

/// The outcome of loading a directory.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Every table that loaded.
    pub store: TableStore,
    /// Files that failed, invalid tables, and duplicate names.
    pub diagnostics: Vec<Diagnostic>,
}

/// Load every table file in `dir` (not recursive).
///
/// Files are read in path order. When two tables share a name the first
/// one wins and the duplicate is reported.
pub fn load_dir(dir: &Path) -> TableResult<LoadReport> {
    let entries = std::fs::read_dir(dir).map_err(|e| TableError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_table_file(p))
        .collect();
    paths.sort();

    let mut report = LoadReport::default();
    for path in &paths {
        let file_label = path.display().to_string();
        let defs = match load_file(path) {
            Ok(defs) => defs,
            Err(e) => {
                report.diagnostics.push(Diagnostic::error(&file_label, e.to_string()));
                continue;
            }
        };
        for def in defs {
            add_def(&mut report, def, &file_label);
        }
    }

    info!(
        dir = %dir.display(),
        files = paths.len(),
        tables = report.store.len(),
        problems = report.diagnostics.len(),
        "loaded tables"
    );
    Ok(report)
}

fn add_def(report: &mut LoadReport, def: TableDef, file_label: &str) {
    match Table::from_def(def) {
        Ok(table) => {
            if report.store.contains(table.name()) {
                report.diagnostics.push(Diagnostic::error(
                    table.name(),
                    format!("duplicate table name (second copy in {file_label} ignored)"),
                ));
            } else {
                report.store.put(table);
            }
        }
        Err(e) => report.diagnostics.push(Diagnostic::error(file_label, e.to_string())),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn is_table_file(path: &Path) -> bool {
    extension(path).is_some_and(|ext| TABLE_EXTENSIONS.contains(&ext.as_str()))
}
