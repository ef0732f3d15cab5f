use std::path::Path;

use colored::Colorize;

use tr_tables::LinkToken;

pub fn run(dir: &Path, name: &str) -> Result<(), String> {
    let store = super::load_tables(dir)?;
    let table = super::find_table(&store, name)?;

    let roll = match table.effective_roll() {
        Ok(spec) if spec.to_string() != table.roll().to_string() => {
            format!("{} = {spec}", table.roll())
        }
        _ => table.roll().to_string(),
    };
    println!("  {} [{}]", table.name().bold(), roll.dimmed());
    if let Some(group) = table.group() {
        println!("  group: {group}");
    }
    println!();

    let width = table
        .results()
        .keys()
        .map(|k| k.to_string().len())
        .max()
        .unwrap_or(1);
    for (key, result) in table.results() {
        println!("  {key:>width$}  {result}");
        let targets: Vec<&str> = result.links().filter_map(LinkToken::table_name).collect();
        if !targets.is_empty() {
            let note = format!("-> {}", targets.join(", "));
            println!("  {:>width$}  {}", "", note.dimmed());
        }
    }

    Ok(())
}
