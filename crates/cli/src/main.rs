mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use truthlens_core::client::{InvestigationClient, Investigator};
use truthlens_core::config::Config;
use truthlens_core::db::{self, SavedFilter};
use truthlens_core::preferences::{Language, Preferences, Theme};
use truthlens_core::progress;
use truthlens_core::session::{AppState, InvestigationSession};
use truthlens_core::verdict::VerdictFilter;

#[derive(Parser)]
#[command(name = "truthlens")]
#[command(about = "TruthLens claim investigation CLI", long_about = None)]
struct Cli {
    /// TOML config file (api base url, storage paths)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Owner of saved fact-checks
    #[arg(long, global = true, default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a claim to the analysis backend and show the verdict
    Investigate {
        claim: String,

        /// Store the result in the saved fact-checks database
        #[arg(long)]
        save: bool,

        /// Print the raw result as JSON instead of the report
        #[arg(long)]
        json: bool,
    },
    /// Check whether the analysis backend is reachable
    Health,
    /// Manage saved fact-checks
    Saved {
        #[command(subcommand)]
        command: SavedCommands,
    },
    /// Export saved fact-checks as an Obsidian vault
    Vault {
        #[command(subcommand)]
        command: VaultCommands,
    },
    /// Export canonical JSON Schemas to the ./schemas directory
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    /// Show or change display preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },
}

#[derive(Subcommand)]
enum SavedCommands {
    /// List saved fact-checks, newest first
    List {
        /// Case-insensitive text to look for in the claim
        #[arg(long)]
        search: Option<String>,

        /// verified, false, unverified or all
        #[arg(long)]
        verdict: Option<VerdictFilter>,
    },
    /// Delete one saved fact-check by id
    Delete { id: String },
    /// Totals per verdict
    Stats,
}

#[derive(Subcommand)]
enum VaultCommands {
    /// Write notes and index pages for every saved fact-check
    Build {
        #[arg(long, default_value = "vault")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for canonical types
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum PrefsCommands {
    Show,
    Set {
        /// light or dark
        #[arg(long)]
        theme: Option<Theme>,

        /// english, spanish, french or german
        #[arg(long)]
        language: Option<Language>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    debug!(api = %config.api_base_url, db = %config.db_path.display(), "config loaded");

    match cli.command {
        Commands::Investigate { claim, save, json } => {
            investigate(&config, &cli.user, &claim, save, json).await
        }
        Commands::Health => health(&config).await,
        Commands::Saved { command } => {
            saved(&config, &cli.user, command)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Vault { command } => match command {
            VaultCommands::Build { out } => {
                let conn = db::open(&config.db_path)?;
                let written = obsidian::build_vault(&conn, &cli.user, &out)?;
                println!("Wrote {written} fact-check notes to {}", out.display());
                Ok(ExitCode::SUCCESS)
            }
        },
        Commands::Schema { command } => match command {
            SchemaCommands::Export { out_dir } => {
                schema_export(&out_dir)?;
                Ok(ExitCode::SUCCESS)
            }
        },
        Commands::Prefs { command } => {
            prefs(&config, command)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn investigate(
    config: &Config,
    user: &str,
    claim: &str,
    save: bool,
    json: bool,
) -> Result<ExitCode> {
    let prefs = Preferences::load(&config.preferences_path)?;
    let client = InvestigationClient::new(&config.api_base_url)?;
    let mut session = InvestigationSession::new(client);

    let ticket = match session.begin(claim) {
        Ok(ticket) => ticket,
        Err(err) => {
            eprintln!("{err}");
            return Ok(ExitCode::from(2));
        }
    };

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {msg}")?.progress_chars("=> "),
    );

    // The ticker only decorates the wait; the request alone decides when it ends.
    let started = Instant::now();
    let outcome = {
        let request = session.investigator().investigate(claim);
        tokio::pin!(request);
        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);
        let mut ticker = tokio::time::interval(Duration::from_millis(100));

        loop {
            tokio::select! {
                outcome = &mut request => break Some(outcome),
                _ = &mut interrupt => break None,
                _ = ticker.tick() => {
                    let frame = progress::frame_at(started.elapsed());
                    bar.set_position(frame.progress as u64);
                    bar.set_message(frame.line());
                }
            }
        }
    };
    bar.finish_and_clear();

    match outcome {
        Some(outcome) => {
            session.settle(ticket, outcome);
        }
        None => {
            session.reset();
            eprintln!("Investigation cancelled.");
            return Ok(ExitCode::from(130));
        }
    }

    match session.state() {
        AppState::Complete => {
            let Some(result) = session.result() else {
                return Ok(ExitCode::FAILURE);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(result)?);
            } else {
                print!("{}", render::report(result, &prefs));
            }
            if save {
                let conn = db::open(&config.db_path)?;
                let saved = db::save_fact_check(&conn, user, result)?;
                eprintln!("Saved as {}", saved.id);
            }
            Ok(ExitCode::SUCCESS)
        }
        AppState::Idle | AppState::Processing => {
            if let Some(err) = session.take_error() {
                eprintln!("{}", err.message().red());
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn health(config: &Config) -> Result<ExitCode> {
    let client = InvestigationClient::new(&config.api_base_url)?;
    if client.health_check().await {
        println!("Backend at {} is healthy", client.base_url());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Backend at {} is unreachable", client.base_url());
        Ok(ExitCode::FAILURE)
    }
}

fn saved(config: &Config, user: &str, command: SavedCommands) -> Result<()> {
    let conn = db::open(&config.db_path)
        .with_context(|| format!("Failed to open {}", config.db_path.display()))?;
    let prefs = Preferences::load(&config.preferences_path)?;

    match command {
        SavedCommands::List { search, verdict } => {
            let filter = SavedFilter {
                search,
                verdict: verdict.and_then(VerdictFilter::label),
            };
            let checks = db::list_fact_checks(&conn, user, &filter)?;
            if checks.is_empty() {
                println!("No saved fact-checks found.");
            }
            for check in &checks {
                println!("{}", render::saved_line(check, prefs.theme));
            }
        }
        SavedCommands::Delete { id } => {
            if db::delete_fact_check(&conn, user, &id)? {
                println!("Deleted {id}");
            } else {
                println!("No saved fact-check with id {id}");
            }
        }
        SavedCommands::Stats => {
            let checks = db::list_fact_checks(&conn, user, &SavedFilter::default())?;
            println!("{}", render::stats(&db::saved_stats(&checks)));
        }
    }
    Ok(())
}

fn prefs(config: &Config, command: PrefsCommands) -> Result<()> {
    let mut prefs = Preferences::load(&config.preferences_path)?;
    match command {
        PrefsCommands::Show => {}
        PrefsCommands::Set { theme, language } => {
            if let Some(theme) = theme {
                prefs.theme = theme;
            }
            if let Some(language) = language {
                prefs.language = language;
            }
            prefs.save(&config.preferences_path)?;
        }
    }
    println!("theme = {:?}\nlanguage = {:?}", prefs.theme, prefs.language);
    Ok(())
}

fn schema_export(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;

    let schemas = [
        (
            "InvestigationResult",
            schema_for!(truthlens_core::schema::InvestigationResult),
        ),
        ("Evidence", schema_for!(truthlens_core::schema::Evidence)),
        ("AgentOutput", schema_for!(truthlens_core::schema::AgentOutput)),
        ("SavedFactCheck", schema_for!(truthlens_core::schema::SavedFactCheck)),
    ];
    for (name, schema) in schemas {
        let json = serde_json::to_string_pretty(&schema)?;
        fs::write(out_dir.join(format!("{name}.schema.json")), json)?;
    }

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}
