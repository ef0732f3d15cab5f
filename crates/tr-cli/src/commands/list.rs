use std::path::Path;

use comfy_table::{ContentArrangement, Table};

pub fn run(dir: &Path, group: Option<&str>) -> Result<(), String> {
    let store = super::load_tables(dir)?;

    let tables: Vec<_> = match group {
        Some(group) => store.in_group(group).collect(),
        None => store.all().collect(),
    };

    if tables.is_empty() {
        println!("  No tables found.");
        return Ok(());
    }

    let mut output = Table::new();
    output.set_content_arrangement(ContentArrangement::Dynamic);
    output.set_header(vec!["Name", "Group", "Roll", "Entries"]);

    for table in &tables {
        output.add_row(vec![
            table.name().to_string(),
            table.group().unwrap_or("-").to_string(),
            table.roll().to_string(),
            table.len().to_string(),
        ]);
    }

    println!("{output}");
    println!();
    println!("  {} tables", tables.len());

    Ok(())
}
