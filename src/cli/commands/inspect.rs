use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use std::path::PathBuf;

use crate::config::LedgerConfig;
use crate::errors::LedgerError;
use crate::export::prepare_records;
use crate::fields::{DEFAULT_COLUMN_WIDTH, HeaderSpec};
use crate::reconcile::similarity_statistics;
use crate::records::{self, Batch, EventContext};
use crate::sheet;
use crate::similarity::similarity_breakdown;

pub fn similarity_stats(
    workbook: Option<PathBuf>,
    threshold: Option<f64>,
    config: &LedgerConfig,
) -> Result<Value> {
    let path = workbook.unwrap_or_else(|| config.output.clone());
    let threshold = threshold.unwrap_or(config.thresholds.match_threshold);
    if !(0.0..=100.0).contains(&threshold) {
        return Err(LedgerError::InvalidThreshold {
            name: "threshold",
            value: threshold,
        }
        .into());
    }

    let book = sheet::open_existing(&path)?;
    let worksheet = book
        .get_sheet(&0)
        .ok_or_else(|| anyhow!("workbook {:?} has no worksheet", path))?;
    let headers: Vec<HeaderSpec> = sheet::read_header_titles(worksheet)
        .into_iter()
        .map(|title| HeaderSpec::new(title.trim().to_lowercase(), title, DEFAULT_COLUMN_WIDTH))
        .collect();

    let stats = similarity_statistics(worksheet, &headers, threshold, config.thresholds.method);
    Ok(json!({
        "workbook": path.display().to_string(),
        "method": config.thresholds.method,
        "statistics": stats,
    }))
}

pub fn compare(left: &str, right: &str, config: &LedgerConfig) -> Result<Value> {
    let breakdown = similarity_breakdown(left, right, config.thresholds.method);
    let matches = breakdown.score >= config.thresholds.match_threshold;
    let mut payload = serde_json::to_value(&breakdown)?;
    if let Value::Object(map) = &mut payload {
        map.insert("match_threshold".to_string(), json!(config.thresholds.match_threshold));
        map.insert("matches".to_string(), json!(matches));
    }
    Ok(payload)
}

pub fn headers(batch: PathBuf, config: &LedgerConfig) -> Result<Value> {
    let batch = Batch::load(&batch)?;
    let context = EventContext::from_events(&batch.events);
    let prepared = prepare_records(&batch, &context);
    let fields = records::fields_list(&prepared);
    let headers = config.fields.headers_for(&fields);

    let columns: Vec<Value> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            json!({
                "column": idx + 1,
                "key": header.key,
                "title": header.title,
                "width": header.width,
                "numeric": config.fields.is_numeric(&header.key),
            })
        })
        .collect();
    let excluded: Vec<&String> = fields
        .iter()
        .filter(|key| !headers.iter().any(|header| &header.key == *key))
        .collect();

    Ok(json!({
        "columns": columns,
        "excluded": excluded,
    }))
}
