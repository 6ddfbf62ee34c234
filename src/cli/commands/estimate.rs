use anyhow::Result;
use serde_json::{Value, json};
use std::path::PathBuf;

use crate::config::LedgerConfig;
use crate::estimate::{build_estimate, write_estimate};
use crate::records::Batch;

pub fn estimate(batch: PathBuf, config: &LedgerConfig) -> Result<Value> {
    let batch = Batch::load(&batch)?;
    let estimate = build_estimate(&batch)?;
    write_estimate(&estimate, &config.estimate_output)?;
    Ok(json!({
        "output": config.estimate_output.display().to_string(),
        "estimate": estimate,
    }))
}
