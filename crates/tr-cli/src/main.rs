//! CLI frontend for Table Roller: dice notation and random tables.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tr_tables::{DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "TROLL_LOG";

#[derive(Parser)]
#[command(
    name = "troll",
    about = "Table Roller: roll dice and resolve random tables",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate dice notation such as 3d6kh2+2
    Roll {
        /// Dice notation
        notation: String,

        /// How many times to roll
        #[arg(short, long, default_value = "1")]
        times: u32,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// List loaded tables
    List {
        /// Only tables in this group
        #[arg(short, long)]
        group: Option<String>,

        /// Directory containing table files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Show every result of a table
    Show {
        /// Table name (case-insensitive)
        table: String,

        /// Directory containing table files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Roll on a table and expand its links
    Resolve {
        /// Table name (case-insensitive)
        table: String,

        /// Resolve this result instead of rolling for one
        #[arg(short, long)]
        key: Option<i64>,

        /// How many times to roll
        #[arg(short, long, default_value = "1")]
        times: u32,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum depth of nested table references
        #[arg(
            long,
            default_value_t = DEFAULT_MAX_DEPTH,
            value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_DEPTH_LIMIT))
        )]
        depth: u32,

        /// Directory containing table files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Load every table and report problems
    Check {
        /// Directory containing table files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Roll {
            notation,
            times,
            seed,
        } => commands::roll::run(&notation, times, seed),
        Commands::List { group, dir } => commands::list::run(&dir, group.as_deref()),
        Commands::Show { table, dir } => commands::show::run(&dir, &table),
        Commands::Resolve {
            table,
            key,
            times,
            seed,
            depth,
            dir,
        } => commands::resolve::run(&dir, &table, key, times, seed, depth),
        Commands::Check { dir } => commands::check::run(&dir),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
