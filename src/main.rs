//! sqlskel CLI - statement skeletons for legacy SQL/PLSQL sources

use clap::{Args, Parser, Subcommand};
use sqlskel::config::{self, SqlskelConfig};
use sqlskel::{ui, Analyzer, SessionScope, SessionStore, StoreConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sqlskel")]
#[command(version)]
#[command(about = "Extract DML statement skeletons from legacy SQL/PLSQL sources")]
#[command(long_about = r#"
sqlskel stores SQL/PLSQL sources per session and extracts the nesting of
SELECT, INSERT, UPDATE, DELETE and MERGE statements with line ranges.

The storage root comes from DOCKER_COMPOSE_CONTEXT, then sqlskel.toml,
then ../data relative to the working directory.

Example usage:
  sqlskel upload -s abc123 ./legacy/*.sql
  sqlskel analyze -s abc123 PKG_ORDERS.sql
  sqlskel batch -s abc123 PKG_ORDERS PKG_BILLING
  sqlskel find -s abc123 pkg_orders
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScopeArgs {
    /// Session key
    #[arg(short, long)]
    session: String,

    /// Logical project inside the session
    #[arg(short, long)]
    project: Option<String>,
}

impl ScopeArgs {
    fn scope(&self) -> sqlskel::Result<SessionScope> {
        let scope = SessionScope::new(&self.session)?;
        match &self.project {
            Some(project) => scope.with_project(project),
            None => Ok(scope),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sqlskel.toml config file
    Init {
        /// Storage base directory to record
        #[arg(short, long)]
        base_dir: Option<String>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Store source files in a session (existing names are kept)
    Upload {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Analyze one stored source file
    Analyze {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Stored file name (e.g. PKG_ORDERS.sql)
        file_name: String,

        /// Re-parse even if an artifact exists
        #[arg(short, long)]
        force: bool,
    },

    /// Analyze a list of objects, resolved to <name>.sql
    Batch {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Object names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Re-analyze every .sql file in the session's source directory
    AnalyzeAll {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Find stored files declaring an object
    Find {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Object name (case-insensitive)
        object: String,
    },

    /// Print the stored statement tree for a file
    Show {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Stored file name
        file_name: String,
    },
}

fn print_records(json: bool, records: &[sqlskel::FileRecord]) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{} No files.", ui::Icons::EMPTY);
    } else {
        println!("{}", ui::records_table(records));
    }
    Ok(())
}

/// Resolve storage once per process and build the analyzer
fn open_analyzer(config_path: Option<&Path>) -> anyhow::Result<Analyzer> {
    let store_config = StoreConfig::resolve(config::load_config(config_path)?);
    tracing::debug!("Storage base directory: {}", store_config.base_dir.display());
    Ok(Analyzer::with_scanner(SessionStore::new(store_config)))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { base_dir, force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            let file = SqlskelConfig {
                base_dir,
                encodings: Some(config::DEFAULT_ENCODINGS.iter().map(|s| s.to_string()).collect()),
            };
            config::write_config(&path, &file, force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }

        Commands::Upload { scope, files } => {
            let analyzer = open_analyzer(cli.config.as_deref())?;
            let scope = scope.scope()?;
            let mut records = Vec::new();
            for path in &files {
                let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                    ui::warn(&format!("Skipping {}: not a file name", path.display()));
                    continue;
                };
                let bytes = std::fs::read(path)?;
                let record = analyzer.store().save_upload(&scope, file_name, &bytes)?;
                if !cli.json {
                    ui::record(&record);
                }
                records.push(record);
            }
            if cli.json {
                print_records(true, &records)?;
            }
        }

        Commands::Analyze { scope, file_name, force } => {
            let analyzer = open_analyzer(cli.config.as_deref())?;
            let scope = scope.scope()?;
            let outcome = if force {
                analyzer.analyze_file_fresh(&scope, &file_name)?
            } else {
                analyzer.analyze_file(&scope, &file_name)?
            };

            if cli.json {
                let data = serde_json::json!({
                    "fileName": file_name,
                    "artifact": outcome.path(),
                    "cached": outcome.was_cached(),
                });
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else if outcome.was_cached() {
                println!("{} Already analyzed: {}", ui::Icons::CACHE, outcome.path().display());
            } else {
                ui::success(&format!("Analyzed {} -> {}", file_name, outcome.path().display()));
            }
        }

        Commands::Batch { scope, names } => {
            let analyzer = open_analyzer(cli.config.as_deref())?;
            let records = analyzer.process_batch(&scope.scope()?, names.as_slice())?;
            if !cli.json && records.len() < names.len() {
                ui::warn(&format!("{} of {} name(s) not found", names.len() - records.len(), names.len()));
            }
            print_records(cli.json, &records)?;
        }

        Commands::AnalyzeAll { scope } => {
            let analyzer = open_analyzer(cli.config.as_deref())?;
            let scope = scope.scope()?;
            if !cli.json {
                ui::header(&format!("Analyzing all sources in session {}", scope));
            }
            let records = analyzer.analyze_directory(&scope)?;
            print_records(cli.json, &records)?;
        }

        Commands::Find { scope, object } => {
            if !cli.json {
                println!("{} Searching for {}...", ui::Icons::SEARCH, object);
            }
            let analyzer = open_analyzer(cli.config.as_deref())?;
            let records = analyzer.store().retrieve_files(&scope.scope()?, &object)?;
            if records.len() > 1 && !cli.json {
                ui::warn(&format!("{} files declare {}", records.len(), object));
            }
            print_records(cli.json, &records)?;
        }

        Commands::Show { scope, file_name } => {
            let analyzer = open_analyzer(cli.config.as_deref())?;
            let Some(artifact) = analyzer.store().read_artifact(&scope.scope()?, &file_name)? else {
                anyhow::bail!("No analysis for {} (run `sqlskel analyze` first)", file_name);
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&artifact)?);
            } else {
                ui::tree(&artifact);
            }
        }
    }

    Ok(())
}
