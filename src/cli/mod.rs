pub mod commands;
pub mod errors;
pub mod output;

use crate::config::{CliArgs, LedgerConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "contract-ledger",
    version,
    about = "Reconcile event contracts into an Excel database and build budget estimates"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Print compact JSON")]
    pub compact: bool,

    #[arg(long, global = true, help = "Only log errors; implies --compact")]
    pub quiet: bool,

    #[arg(short, long, global = true, help = "Log reconciliation details")]
    pub verbose: bool,

    #[command(flatten)]
    pub settings: CliArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile a batch of contracts into the database workbook.
    Export { batch: PathBuf },
    /// Build the budget estimate workbook for a batch.
    Estimate { batch: PathBuf },
    /// Pairwise product-name similarity of an existing database workbook.
    SimilarityStats {
        /// Workbook to analyze (default: the configured output).
        workbook: Option<PathBuf>,
        #[arg(long, value_name = "PERCENT")]
        threshold: Option<f64>,
    },
    /// Score two strings the way product names are compared.
    Compare { left: String, right: String },
    /// Show the column layout a batch would export with.
    Headers { batch: PathBuf },
}

pub fn run_command(command: Commands, config: &LedgerConfig) -> Result<Value> {
    match command {
        Commands::Export { batch } => commands::export::export(batch, config),
        Commands::Estimate { batch } => commands::estimate::estimate(batch, config),
        Commands::SimilarityStats {
            workbook,
            threshold,
        } => commands::inspect::similarity_stats(workbook, threshold, config),
        Commands::Compare { left, right } => commands::inspect::compare(&left, &right, config),
        Commands::Headers { batch } => commands::inspect::headers(batch, config),
    }
}
