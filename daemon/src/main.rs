//! Lattice ledger maintenance tool.

mod commands;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lattice_store::MigrationOutcome;
use lattice_types::NetworkId;

use crate::config::LedgerConfig;
use crate::logging::init_logging;

#[derive(Parser)]
#[command(name = "lattice-daemon", about = "Lattice ledger maintenance tool", version)]
struct Cli {
    /// Path to a TOML configuration file. Flags and environment variables
    /// override its values.
    #[arg(long, env = "LATTICE_CONFIG")]
    config: Option<PathBuf>,

    /// Network: "live", "test" or "dev".
    #[arg(long, env = "LATTICE_NETWORK")]
    network: Option<NetworkId>,

    /// Ledger data directory.
    #[arg(long, env = "LATTICE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[arg(long, env = "LATTICE_LOG_LEVEL")]
    log_level: Option<String>,

    /// "human" or "json".
    #[arg(long, env = "LATTICE_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or upgrade the ledger and write the genesis block.
    Initialize,
    /// Upgrade the database schema to the current version.
    Migrate,
    /// Drop every block waiting on a missing dependency.
    ClearUnchecked,
    ClearPeers,
    ClearOnlineWeight,
    /// Set every confirmation height back to zero (genesis stays confirmed).
    ResetConfirmationHeight,
    /// Rewrite the data file without free pages.
    Vacuum,
    /// Print schema versions and table sizes.
    Version {
        #[arg(long)]
        json: bool,
    },
    /// Check table key widths.
    Check,
    /// Process hex-encoded blocks from a file, one per line.
    Import { file: PathBuf },
    /// Show an account by address or hex key.
    Account {
        address: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => LedgerConfig::from_toml_file(path)?,
            None => LedgerConfig::default(),
        };
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.clone();
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    init_logging(config.log_format()?, &config.log_level)
        .context("installing log subscriber")?;

    tracing::debug!(
        network = config.network.as_str(),
        data_dir = %config.data_dir.display(),
        "loaded configuration"
    );

    match cli.command {
        Command::Initialize => {
            if commands::initialize(&config)? {
                println!("wrote genesis block for {} network", config.network.as_str());
            } else {
                println!("ledger already initialized");
            }
        }
        Command::Migrate => match commands::migrate(&config)? {
            MigrationOutcome::Initialized => println!("initialized empty database"),
            MigrationOutcome::UpToDate => println!("schema is up to date"),
            MigrationOutcome::Upgraded { from, to } => {
                println!("upgraded schema from version {from} to {to}")
            }
        },
        Command::ClearUnchecked => {
            println!("removed {} unchecked blocks", commands::clear_unchecked(&config)?)
        }
        Command::ClearPeers => println!("removed {} peers", commands::clear_peers(&config)?),
        Command::ClearOnlineWeight => println!(
            "removed {} online weight samples",
            commands::clear_online_weight(&config)?
        ),
        Command::ResetConfirmationHeight => println!(
            "reset confirmation height of {} accounts",
            commands::reset_confirmation_height(&config)?
        ),
        Command::Vacuum => {
            let path = commands::vacuum(&config)?;
            println!("vacuumed {}", path.display());
        }
        Command::Version { json } => {
            let report = commands::version(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let stored = report
                    .stored
                    .map_or_else(|| "none".to_string(), |v| v.to_string());
                println!("backend:  {}", report.backend);
                println!("schema:   {stored} (supported {}..={})", report.minimum, report.current);
                for table in &report.tables {
                    let marker = if table.estimated { "~" } else { "" };
                    println!("  {:<20} {marker}{}", table.table, table.entries);
                }
            }
        }
        Command::Check => {
            let report = commands::check(&config)?;
            println!(
                "checked {} tables, {} entries",
                report.tables_checked, report.total_entries
            );
            for error in &report.errors {
                println!("  {error}");
            }
            if !report.is_healthy() {
                anyhow::bail!("{} integrity errors", report.errors.len());
            }
        }
        Command::Import { file } => {
            let summary = commands::import(&config, &file)?;
            println!(
                "processed {}: {} applied, {} already known, {} waiting, {} rejected",
                summary.processed, summary.progressed, summary.old, summary.gaps, summary.rejected
            );
        }
        Command::Account { address, json } => {
            let summary = commands::account(&config, &address)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary.address);
                if summary.opened {
                    println!("  balance:       {}", summary.balance);
                    println!("  blocks:        {}", summary.block_count);
                    println!("  confirmed:     {}", summary.confirmation_height);
                    if let Some(head) = &summary.head {
                        println!("  head:          {head}");
                    }
                    if let Some(representative) = &summary.representative {
                        println!("  representative {representative}");
                    }
                } else {
                    println!("  not opened");
                }
                println!("  weight:        {}", summary.weight);
                println!("  pending:       {}", summary.pending);
            }
        }
        Command::Config => print!("{}", config.to_toml_string()?),
    }

    Ok(())
}
