//! Implace CLI
//!
//! Deduplicates points of interest gathered by overlapping radius searches
//! and writes the canonical, audit and per-type tables.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use implace_core::DedupConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "implace")]
#[command(about = "Deduplicate places gathered by overlapping radius searches")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the per-user config if present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log skipped records and other debug detail
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter duplicates and write the canonical and audit tables
    #[command(after_help = "\
Examples:
  implace dedup -i raw.json -o places.csv -a removed.csv
  implace dedup -i page1.json -i page2.json -o places.csv -a removed.csv --split-dir types
  implace dedup -i places.csv -o places2.csv -a removed2.csv")]
    Dedup {
        /// Raw JSON (.json, .txt) or canonical table (.csv); repeatable
        #[arg(long, short = 'i', required = true)]
        input: Vec<PathBuf>,

        /// Canonical table of surviving records
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Removed records grouped by removal reason
        #[arg(long, short = 'a')]
        audit: PathBuf,

        /// Also write empty_type.csv and filled_type.csv here
        #[arg(long, value_name = "DIR")]
        split_dir: Option<PathBuf>,

        /// Also write a type,count table
        #[arg(long, value_name = "PATH")]
        type_counts: Option<PathBuf>,
    },

    /// Split a table into untyped and typed records
    Split {
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Records without a type
        #[arg(long)]
        empty: PathBuf,

        /// Records with a type
        #[arg(long)]
        filled: PathBuf,
    },

    /// Count records per type
    CountTypes {
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<DedupConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => DedupConfig::load(path)?,
        None => DedupConfig::load_default()?,
    };
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Dedup {
            input,
            output,
            audit,
            split_dir,
            type_counts,
        } => {
            let summary = commands::dedup(
                &config,
                &input,
                &commands::DedupOutputs {
                    canonical: output,
                    audit,
                    split_dir,
                    type_counts,
                },
            )?;
            print!("{summary}");
        }
        Commands::Split {
            input,
            empty,
            filled,
        } => {
            let (untyped, typed) = commands::split(&config, &input, &empty, &filled)?;
            println!("Untyped: {untyped}");
            println!("Typed:   {typed}");
        }
        Commands::CountTypes { input, output } => {
            let table = commands::count_types(&config, &input, output.as_deref())?;
            if let Some(table) = table {
                print!("{table}");
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dedup_with_several_inputs() {
        let cli = Cli::try_parse_from([
            "implace", "--verbose", "dedup", "-i", "a.json", "-i", "b.json", "-o", "out.csv", "-a",
            "audit.csv",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Dedup { input, split_dir, .. } => {
                assert_eq!(input.len(), 2);
                assert!(split_dir.is_none());
            }
            _ => panic!("expected dedup"),
        }
    }

    #[test]
    fn test_dedup_requires_input() {
        assert!(Cli::try_parse_from(["implace", "dedup", "-o", "out.csv", "-a", "audit.csv"]).is_err());
    }
}
