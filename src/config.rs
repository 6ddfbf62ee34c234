use crate::export::ExportMode;
use crate::fields::{FieldSpec, FieldTable};
use crate::reconcile::Thresholds;
use crate::similarity::SimilarityMethod;
use anyhow::{Context, Result};
use clap::Args;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT: &str = "база_даних.xlsx";
const DEFAULT_SHEET_NAME: &str = "База даних";
const DEFAULT_ESTIMATE_OUTPUT: &str = "кошторис.xlsx";

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub output: PathBuf,
    pub sheet_name: String,
    pub mode: ExportMode,
    pub thresholds: Thresholds,
    pub estimate_output: PathBuf,
    pub fields: FieldTable,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            mode: ExportMode::Update,
            thresholds: Thresholds::default(),
            estimate_output: PathBuf::from(DEFAULT_ESTIMATE_OUTPUT),
            fields: FieldTable::default(),
        }
    }
}

impl LedgerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            output: cli_output,
            sheet_name: cli_sheet_name,
            overwrite: cli_overwrite,
            match_threshold: cli_match_threshold,
            method: cli_method,
            estimate_output: cli_estimate_output,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            output: file_output,
            sheet_name: file_sheet_name,
            overwrite: file_overwrite,
            match_threshold: file_match_threshold,
            method: file_method,
            significant_below: file_significant_below,
            minor_from: file_minor_from,
            max_significant_pct: file_max_significant_pct,
            max_combined_pct: file_max_combined_pct,
            estimate_output: file_estimate_output,
            fields: file_fields,
            numeric_fields: file_numeric_fields,
        } = file_config;

        let output = cli_output
            .or(file_output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
        let sheet_name = cli_sheet_name
            .or(file_sheet_name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
        anyhow::ensure!(
            sheet_name.chars().count() <= 31,
            "sheet name '{sheet_name}' is longer than 31 characters"
        );

        let mode = if cli_overwrite || file_overwrite.unwrap_or(false) {
            ExportMode::Overwrite
        } else {
            ExportMode::Update
        };

        let defaults = Thresholds::default();
        let thresholds = Thresholds {
            match_threshold: cli_match_threshold
                .or(file_match_threshold)
                .unwrap_or(defaults.match_threshold),
            significant_below: file_significant_below.unwrap_or(defaults.significant_below),
            minor_from: file_minor_from.unwrap_or(defaults.minor_from),
            max_significant_pct: file_max_significant_pct.unwrap_or(defaults.max_significant_pct),
            max_combined_pct: file_max_combined_pct.unwrap_or(defaults.max_combined_pct),
            method: cli_method.or(file_method).unwrap_or_default(),
        };
        thresholds.validate()?;

        let estimate_output = cli_estimate_output
            .or(file_estimate_output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ESTIMATE_OUTPUT));

        let fields = match (file_fields, file_numeric_fields) {
            (None, None) => FieldTable::default(),
            (overrides, numeric) => {
                FieldTable::with_overrides(overrides.unwrap_or_default(), numeric)
            }
        };

        Ok(Self {
            output,
            sheet_name,
            mode,
            thresholds,
            estimate_output,
            fields,
        })
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "CONTRACT_LEDGER_OUTPUT",
        value_name = "FILE",
        help = "Database workbook to update (default: база_даних.xlsx)",
        global = true
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        env = "CONTRACT_LEDGER_SHEET_NAME",
        value_name = "NAME",
        help = "Worksheet name used when a new database workbook is created",
        global = true
    )]
    pub sheet_name: Option<String>,

    #[arg(
        long,
        env = "CONTRACT_LEDGER_OVERWRITE",
        help = "Rebuild the database workbook instead of reconciling into it",
        global = true
    )]
    pub overwrite: bool,

    #[arg(
        long,
        env = "CONTRACT_LEDGER_MATCH_THRESHOLD",
        value_name = "PERCENT",
        help = "Minimum product similarity for a row to count as the same contract (default: 80)",
        global = true
    )]
    pub match_threshold: Option<f64>,

    #[arg(
        long,
        env = "CONTRACT_LEDGER_METHOD",
        value_enum,
        help = "Similarity method for product and text comparison",
        global = true
    )]
    pub method: Option<SimilarityMethod>,

    #[arg(
        long,
        env = "CONTRACT_LEDGER_ESTIMATE_OUTPUT",
        value_name = "FILE",
        help = "Estimate workbook path (default: кошторис.xlsx)",
        global = true
    )]
    pub estimate_output: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    output: Option<PathBuf>,
    sheet_name: Option<String>,
    overwrite: Option<bool>,
    match_threshold: Option<f64>,
    method: Option<SimilarityMethod>,
    significant_below: Option<f64>,
    minor_from: Option<f64>,
    max_significant_pct: Option<f64>,
    max_combined_pct: Option<f64>,
    estimate_output: Option<PathBuf>,
    fields: Option<IndexMap<String, FieldSpec>>,
    numeric_fields: Option<Vec<String>>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
