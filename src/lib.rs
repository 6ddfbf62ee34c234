pub mod amount_words;
pub mod cli;
pub mod config;
pub mod errors;
pub mod estimate;
pub mod export;
pub mod fields;
pub mod logging;
pub mod reconcile;
pub mod records;
pub mod sheet;
pub mod similarity;
pub mod styles;

pub use config::{CliArgs, LedgerConfig};
pub use errors::LedgerError;
pub use export::{ExportMode, ExportOptions, ExportReport, export_batch};
pub use fields::{FieldSpec, FieldTable, HeaderSpec};
pub use reconcile::{MatchOutcome, Thresholds, reconcile_row};
pub use records::{Batch, ContractRecord, EventInfo};
pub use sheet::CellValue;
pub use similarity::{SimilarityMethod, similarity_score};
