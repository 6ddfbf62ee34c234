use thiserror::Error;

/// Failures the CLI classifies into stable error codes.
///
/// Header mismatches and numeric-conversion problems are not represented here;
/// they are logged and the export carries on.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to open workbook '{path}': {message}")]
    WorkbookOpen { path: String, message: String },

    #[error("failed to save workbook '{path}': {message}")]
    WorkbookSave { path: String, message: String },

    #[error("failed to load batch '{path}': {message}")]
    BatchLoad { path: String, message: String },

    #[error("no estimate items found; contracts need a product name, quantity and unit price")]
    NothingToEstimate,

    #[error("invalid threshold {name}={value} (expected a value between 0 and 100)")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LedgerError {
    pub fn workbook_save(path: impl Into<String>, message: impl ToString) -> Self {
        Self::WorkbookSave {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn workbook_open(path: impl Into<String>, message: impl ToString) -> Self {
        Self::WorkbookOpen {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn batch_load(path: impl Into<String>, message: impl ToString) -> Self {
        Self::BatchLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::WorkbookOpen { .. } => "WORKBOOK_OPEN_FAILED",
            Self::WorkbookSave { .. } => "WORKBOOK_SAVE_FAILED",
            Self::BatchLoad { .. } => "BATCH_INVALID",
            Self::NothingToEstimate => "NOTHING_TO_ESTIMATE",
            Self::InvalidThreshold { .. } => "INVALID_THRESHOLD",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}
