use std::path::Path;

use colored::Colorize;
use tracing::debug;

use tr_tables::{Resolution, Resolver, ResolverConfig};

pub fn run(
    dir: &Path,
    name: &str,
    key: Option<i64>,
    times: u32,
    seed: Option<u64>,
    depth: u32,
) -> Result<(), String> {
    let store = super::load_tables(dir)?;
    let table = super::find_table(&store, name)?;

    let config = ResolverConfig {
        max_depth: depth,
        seed,
    };
    let (mut rng, seed) = config.make_rng();
    let resolver = Resolver::with_config(&store, &config);
    debug!(table = table.name(), seed, depth, times, "resolving");

    for i in 0..times {
        if i > 0 {
            println!();
        }
        let resolution = match key {
            Some(key) => {
                println!("{}", format!("{} #{key}", table.name()).dimmed());
                resolver
                    .resolve(table, key, &mut rng)
                    .map_err(|e| e.to_string())?
            }
            None => {
                let entry = resolver.roll(table, &mut rng).map_err(|e| e.to_string())?;
                println!("{}", format!("{} {}", entry.table, entry.outcome).dimmed());
                entry.resolution
            }
        };
        print_resolution(&resolution);
    }
    eprintln!("  {}", format!("seed {seed}").dimmed());

    Ok(())
}

fn print_resolution(resolution: &Resolution) {
    println!("{resolution}");
    for issue in &resolution.issues {
        eprintln!("  {} {issue}", "warning:".yellow());
    }
}
