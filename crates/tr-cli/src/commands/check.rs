use std::path::Path;

use tr_tables::{check_store, has_errors, load_dir};

pub fn run(dir: &Path) -> Result<(), String> {
    let report = load_dir(dir).map_err(|e| e.to_string())?;

    let mut diagnostics = report.diagnostics;
    diagnostics.extend(check_store(&report.store));
    super::print_diagnostics(&report.store, &diagnostics);

    if has_errors(&diagnostics) {
        return Err("check failed with errors".into());
    }

    println!("  All checks passed.");
    println!("  {} tables", report.store.len());

    Ok(())
}
