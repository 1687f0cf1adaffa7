//! epicrank CLI - rank epics into BUILD / PROTOTYPE / HOLD-KILL recommendations

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use epicrank_core::config::{self, ResolvedConfig};
use epicrank_core::epic::Epic;
use epicrank_core::{
    input, rank_epics, rank_with_config, render_explain, render_json, render_text,
};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "epicrank")]
#[command(about = "Triage and rank epics through the VUFB gate, NDR score and 5-year NPV")]
#[command(version = env!("EPICRANK_VERSION"))]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate and rank every epic in a JSON file
    Rank {
        /// Path to a JSON array of epics
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Show only top N results (overrides config file)
        #[arg(long)]
        top: Option<usize>,

        /// Minimum NDR score to show (overrides config file)
        #[arg(long)]
        min_ndr: Option<f64>,

        /// Omit gated epics
        #[arg(long)]
        hide_gated: bool,

        /// Refuse to score epics with out-of-range inputs
        #[arg(long)]
        strict: bool,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show the full scoring breakdown for one epic
    Explain {
        /// Path to a JSON array of epics
        path: PathBuf,

        /// Id of the epic to explain
        #[arg(long)]
        id: u64,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Print a new epic pre-filled with default scores and financials
    Template {
        /// Id to give the template
        #[arg(long, default_value = "1")]
        id: u64,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without ranking anything
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Overrides from `rank` flags
struct RankFlags {
    top: Option<usize>,
    min_ndr: Option<f64>,
    hide_gated: bool,
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.verbose { Level::DEBUG } else { Level::WARN });

    match cli.command {
        Commands::Rank {
            path,
            format,
            top,
            min_ndr,
            hide_gated,
            strict,
            config: config_path,
        } => {
            let epics = load_epics_arg(&path)?;

            let project_root = std::env::current_dir()?;
            let resolved = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;
            if let Some(config_path) = &resolved.config_path {
                eprintln!("Using config: {}", config_path.display());
            }

            let effective = apply_flags(
                resolved,
                RankFlags {
                    top,
                    min_ndr,
                    hide_gated,
                    strict,
                },
            )?;
            let ranked = rank_with_config(&epics, &effective)?;

            match format {
                OutputFormat::Text => print!("{}", render_text(&ranked)),
                OutputFormat::Json => println!("{}", render_json(&ranked)),
            }
        }
        Commands::Explain { path, id, format } => {
            let epics = load_epics_arg(&path)?;
            let ranked = rank_epics(&epics);
            let (position, evaluated) = ranked
                .iter()
                .enumerate()
                .find(|(_, e)| e.epic.id == id)
                .ok_or_else(|| anyhow::anyhow!("No epic with id {} in {}", id, path.display()))?;

            match format {
                OutputFormat::Text => {
                    println!("Rank {} of {}", position + 1, ranked.len());
                    print!("{}", render_explain(evaluated));
                }
                OutputFormat::Json => {
                    let json = serde_json_pretty(evaluated)?;
                    println!("{}", json);
                }
            }
        }
        Commands::Template { id } => {
            let json = serde_json_pretty(&Epic::template(id))?;
            println!("{}", json);
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                match config::load_and_resolve(&project_root, path.as_deref()) {
                    Ok(resolved) => {
                        if let Some(ref p) = resolved.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Initialise the global tracing subscriber on stderr
///
/// `RUST_LOG` takes precedence over `default_level`.
fn init_tracing(default_level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}

fn load_epics_arg(path: &Path) -> anyhow::Result<Vec<Epic>> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }
    input::load_epics(path)
}

/// CLI flags override config file values
///
/// The merged values get the same checks as a config file.
fn apply_flags(mut resolved: ResolvedConfig, flags: RankFlags) -> anyhow::Result<ResolvedConfig> {
    resolved.top_n = flags.top.or(resolved.top_n);
    resolved.min_ndr = flags.min_ndr.or(resolved.min_ndr);
    resolved.hide_gated |= flags.hide_gated;
    resolved.strict |= flags.strict;
    resolved
        .validate()
        .context("invalid command-line override")?;
    Ok(resolved)
}

fn serde_json_pretty<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize to JSON")
}

fn print_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!();
    println!("Filters:");
    println!(
        "  top: {}",
        resolved
            .top_n
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!(
        "  min_ndr: {}",
        resolved
            .min_ndr
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("  hide_gated: {}", resolved.hide_gated);
    println!(
        "  lifecycles: {}",
        resolved
            .lifecycles
            .as_ref()
            .map(|l| l.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", "))
            .unwrap_or_else(|| "all".to_string())
    );
    println!();
    println!("Validation:");
    println!(
        "  strict: {}",
        if resolved.strict {
            "on (invalid epics abort the run)"
        } else {
            "off (invalid epics are logged and scored as given)"
        }
    );
}
