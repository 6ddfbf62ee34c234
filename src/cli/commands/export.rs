use anyhow::Result;
use serde_json::{Value, json};
use std::path::PathBuf;

use crate::config::LedgerConfig;
use crate::export::{ExportOptions, export_batch};
use crate::records::Batch;

pub fn export(batch: PathBuf, config: &LedgerConfig) -> Result<Value> {
    let batch = Batch::load(&batch)?;
    let options = ExportOptions {
        output: config.output.clone(),
        sheet_name: config.sheet_name.clone(),
        mode: config.mode,
        thresholds: config.thresholds,
    };
    let report = export_batch(&batch, &config.fields, &options)?;
    let recommendations = report.recommendations();
    let average_similarity = report.average_similarity();

    let mut payload = serde_json::to_value(&report)?;
    if let Value::Object(map) = &mut payload {
        map.insert("average_similarity".to_string(), json!(average_similarity));
        map.insert("recommendations".to_string(), serde_json::to_value(recommendations)?);
    }
    Ok(payload)
}
