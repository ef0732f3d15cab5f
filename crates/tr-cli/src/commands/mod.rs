pub mod check;
pub mod list;
pub mod resolve;
pub mod roll;
pub mod show;

use std::path::Path;

use tr_tables::{Diagnostic, Severity, Table, TableStore, render_diagnostics};

/// Load every table in `dir`, printing loader problems to stderr.
/// Fails only when nothing could be loaded.
fn load_tables(dir: &Path) -> Result<TableStore, String> {
    let report = tr_tables::load_dir(dir).map_err(|e| e.to_string())?;
    print_diagnostics(&report.store, &report.diagnostics);

    if report.store.is_empty() {
        return Err(format!("no tables found in {}", dir.display()));
    }
    Ok(report.store)
}

/// Look up a table by name, ignoring case.
fn find_table<'a>(store: &'a TableStore, name: &str) -> Result<&'a Table, String> {
    store
        .find(name)
        .ok_or_else(|| format!("table not found: \"{name}\""))
}

/// Print diagnostics to stderr using ariadne, followed by a count.
fn print_diagnostics(store: &TableStore, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let rendered = render_diagnostics(store, diagnostics);
    eprint!("{rendered}");

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics.len() - errors;

    if errors > 0 {
        eprintln!(
            "  {} error{}, {} warning{}",
            errors,
            if errors == 1 { "" } else { "s" },
            warnings,
            if warnings == 1 { "" } else { "s" },
        );
    } else {
        eprintln!(
            "  {} warning{}",
            warnings,
            if warnings == 1 { "" } else { "s" },
        );
    }
}
