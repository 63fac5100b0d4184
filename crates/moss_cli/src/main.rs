//! Operator entry point for the moss catalogue.
//!
//! # Responsibility
//! - `init-schema`: drop and recreate every catalogue table.
//! - `load`: import the taxonomy and species JSON documents.
//!
//! # Invariants
//! - A failed command commits nothing and exits non-zero.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use moss_core::{
    default_log_level, init_logging, init_stderr_logging, initialize_schema, load_files, open_db,
    LoadReport,
};

#[derive(Debug, Parser)]
#[command(name = "moss")]
#[command(about = "Moss taxonomy catalogue tools")]
#[command(version)]
struct Cli {
    /// SQLite database file.
    #[arg(long, default_value = "./moss.sqlite3")]
    db: PathBuf,

    /// trace|debug|info|warn|error; defaults by build mode.
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr when omitted.
    #[arg(long)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Drop and recreate all tables. Destroys existing data.
    InitSchema,
    /// Load taxonomy and species documents into an initialized schema.
    Load {
        #[arg(long, default_value = "moss_taxonomic_hierarchy.json")]
        taxonomy: PathBuf,
        #[arg(long, default_value = "moss_species_data.json")]
        species: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    match cli.log_dir.as_deref() {
        Some(dir) => init_logging(level, dir),
        None => init_stderr_logging(level),
    }
    .map_err(|err| anyhow!(err))
    .context("failed to initialize logging")?;

    let mut conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;

    match cli.command {
        Command::InitSchema => {
            initialize_schema(&mut conn).context("error creating schema")?;
            println!("Schema created successfully in {}", cli.db.display());
        }
        Command::Load { taxonomy, species } => {
            let report =
                load_files(&mut conn, &taxonomy, &species).context("error loading data")?;
            print_report(&report);
        }
    }

    info!("event=cli_exit module=cli status=ok");
    Ok(())
}

fn print_report(report: &LoadReport) {
    for skipped in &report.skipped {
        println!(
            "Genus not found: {} (species {})",
            skipped.genus, skipped.scientific_name
        );
    }
    println!(
        "Taxonomy: {} classes, {} orders, {} families, {} genera ({} new rows)",
        report.classes, report.orders, report.families, report.genera, report.taxa_created
    );
    println!(
        "Species: {} inserted, {} already present, {} skipped",
        report.species_inserted,
        report.species_existing,
        report.skipped.len()
    );
    println!(
        "Habitats: {} new countries, {} new links",
        report.countries_created, report.links_inserted
    );
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn load_defaults_to_fixed_input_names() {
        let cli = Cli::try_parse_from(["moss", "load"]).unwrap();
        assert_eq!(cli.db, PathBuf::from("./moss.sqlite3"));
        match cli.command {
            Command::Load { taxonomy, species } => {
                assert_eq!(taxonomy, PathBuf::from("moss_taxonomic_hierarchy.json"));
                assert_eq!(species, PathBuf::from("moss_species_data.json"));
            }
            Command::InitSchema => panic!("expected load command"),
        }
    }

    #[test]
    fn global_options_precede_subcommand() {
        let cli = Cli::try_parse_from([
            "moss",
            "--db",
            "/tmp/catalogue.sqlite3",
            "--log-level",
            "warn",
            "init-schema",
        ])
        .unwrap();
        assert_eq!(cli.db, PathBuf::from("/tmp/catalogue.sqlite3"));
        assert_eq!(cli.log_level.as_deref(), Some("warn"));
        assert!(matches!(cli.command, Command::InitSchema));
    }
}
