//! Batch export into the database workbook.

use crate::fields::FieldTable;
use crate::reconcile::{ColumnLayout, Reason, ReconcileContext, RowAction, RowOutcome, Thresholds};
use crate::records::{self, Batch, ContractRecord, EventContext};
use crate::sheet::{self, OpenOutcome};
use crate::styles;
use anyhow::{Result, anyhow};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    /// Reconcile every record against the existing workbook.
    #[default]
    Update,
    /// Start a fresh workbook and append every record.
    Overwrite,
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output: PathBuf,
    pub sheet_name: String,
    pub mode: ExportMode,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionStats {
    pub no_event_number: usize,
    pub no_match_found: usize,
    pub similarity_update: usize,
    pub too_many_changes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowReport {
    pub index: usize,
    pub tab_name: String,
    pub event_number: String,
    pub product: String,
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationLevel {
    Suggest,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub level: RecommendationLevel,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub output: String,
    pub started_at: String,
    pub mode: ExportMode,
    pub workbook: OpenOutcome,
    pub match_threshold: f64,
    pub processed: usize,
    pub updated: usize,
    pub added: usize,
    pub action_stats: ActionStats,
    pub similarities: Vec<f64>,
    pub updates_by_similarity: BTreeMap<String, usize>,
    pub additions_by_similarity: BTreeMap<String, usize>,
    pub rows: Vec<RowReport>,
}

/// Ten-point bucket label, e.g. `85.3` → `"80-89%"`.
pub fn similarity_bucket(score: f64) -> String {
    let low = (score.max(0.0) / 10.0).floor() as u32 * 10;
    format!("{}-{}%", low, low + 9)
}

impl ExportReport {
    fn new(options: &ExportOptions, workbook: OpenOutcome) -> Self {
        Self {
            output: options.output.display().to_string(),
            started_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            mode: options.mode,
            workbook,
            match_threshold: options.thresholds.match_threshold,
            processed: 0,
            updated: 0,
            added: 0,
            action_stats: ActionStats::default(),
            similarities: Vec::new(),
            updates_by_similarity: BTreeMap::new(),
            additions_by_similarity: BTreeMap::new(),
            rows: Vec::new(),
        }
    }

    fn record(&mut self, row: RowReport) {
        self.processed += 1;
        let outcome = &row.outcome;
        match outcome.action {
            RowAction::Updated => {
                self.updated += 1;
                self.action_stats.similarity_update += 1;
                if let Some(score) = outcome.similarity {
                    self.similarities.push(score);
                    *self
                        .updates_by_similarity
                        .entry(similarity_bucket(score))
                        .or_default() += 1;
                }
            }
            RowAction::Added => {
                self.added += 1;
                match outcome.reason {
                    Reason::NoEventNumber => self.action_stats.no_event_number += 1,
                    Reason::NoMatchFound => self.action_stats.no_match_found += 1,
                    Reason::TooManySignificantChanges | Reason::TooManyTotalChanges => {
                        self.action_stats.too_many_changes += 1;
                        if let Some(score) = outcome.similarity {
                            self.similarities.push(score);
                            *self
                                .additions_by_similarity
                                .entry(similarity_bucket(score))
                                .or_default() += 1;
                        }
                    }
                    Reason::AcceptableChanges | Reason::OverwriteMode => {}
                }
            }
        }
        self.rows.push(row);
    }

    pub fn average_similarity(&self) -> Option<f64> {
        if self.similarities.is_empty() {
            None
        } else {
            Some(self.similarities.iter().sum::<f64>() / self.similarities.len() as f64)
        }
    }

    /// Tuning hints derived from the run.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        let mut hints = Vec::new();
        if self.processed == 0 {
            return hints;
        }

        let threshold = self.match_threshold;
        if let Some(avg) = self.average_similarity() {
            if avg > threshold + 10.0 {
                hints.push(Recommendation {
                    level: RecommendationLevel::Suggest,
                    message: format!(
                        "consider raising the match threshold to {}% for stricter duplicate detection",
                        avg.min(90.0).trunc()
                    ),
                });
            } else if avg < threshold - 10.0 {
                hints.push(Recommendation {
                    level: RecommendationLevel::Suggest,
                    message: format!(
                        "consider lowering the match threshold to {}% to merge more records",
                        avg.max(60.0).trunc()
                    ),
                });
            }
        }

        let operations = self.updated + self.added;
        if operations > 0 {
            let update_ratio = self.updated as f64 / operations as f64 * 100.0;
            if update_ratio < 20.0 {
                hints.push(Recommendation {
                    level: RecommendationLevel::Suggest,
                    message: format!(
                        "low update ratio ({update_ratio:.1}%); check data quality or thresholds"
                    ),
                });
            } else if update_ratio > 80.0 {
                hints.push(Recommendation {
                    level: RecommendationLevel::Suggest,
                    message: format!(
                        "high update ratio ({update_ratio:.1}%); the input may contain many duplicates"
                    ),
                });
            }
        }

        if self.action_stats.no_event_number as f64 > self.processed as f64 * 0.1 {
            hints.push(Recommendation {
                level: RecommendationLevel::Warning,
                message: "more than 10% of records have no event number".to_string(),
            });
        }

        hints
    }
}

/// Applies common fields and derived amounts to every contract.
pub fn prepare_records(batch: &Batch, context: &EventContext) -> Vec<ContractRecord> {
    batch
        .contracts
        .iter()
        .map(|contract| {
            let mut record = contract.clone();
            context.apply_common(&mut record);
            records::derive_amounts(&mut record.entries);
            record
        })
        .collect()
}

/// Exports `batch` into the workbook at `options.output`.
///
/// All rows are reconciled in memory and the workbook is saved once at the
/// end; a failed save leaves any previous file untouched.
pub fn export_batch(batch: &Batch, table: &FieldTable, options: &ExportOptions) -> Result<ExportReport> {
    options.thresholds.validate()?;

    let context = EventContext::from_events(&batch.events);
    let prepared = prepare_records(batch, &context);
    let headers = table.headers_for(&records::fields_list(&prepared));
    let layout = ColumnLayout::from_headers(&headers);

    let (mut book, workbook) = match options.mode {
        ExportMode::Update => sheet::open_or_create(&options.output, &headers, &options.sheet_name),
        ExportMode::Overwrite => (
            sheet::create_new(&headers, &options.sheet_name),
            OpenOutcome::Created,
        ),
    };
    tracing::info!(
        output = %options.output.display(),
        mode = ?options.mode,
        workbook = ?workbook,
        records = prepared.len(),
        "exporting batch"
    );

    let mut report = ExportReport::new(options, workbook);
    let worksheet = book
        .get_sheet_mut(&0)
        .ok_or_else(|| anyhow!("workbook {:?} has no worksheet", options.output))?;

    let ctx = ReconcileContext {
        headers: &headers,
        layout: &layout,
        table,
        thresholds: &options.thresholds,
    };

    for (index, record) in prepared.iter().enumerate() {
        let event_number = context.resolve_event_number(record);
        let row = records::build_row(&headers, record, &event_number, table);
        let product = records::product_name(&headers, &row);

        let outcome = match options.mode {
            ExportMode::Update => {
                crate::reconcile::reconcile_row(worksheet, &row, &event_number, &product, &ctx)
            }
            ExportMode::Overwrite => RowOutcome {
                action: RowAction::Added,
                row: sheet::append_row(worksheet, &row),
                reason: Reason::OverwriteMode,
                similarity: None,
                analysis: None,
            },
        };
        tracing::info!(
            index = index + 1,
            tab = %record.tab_name,
            action = ?outcome.action,
            row = outcome.row,
            reason = %outcome.reason,
            "record processed"
        );

        report.record(RowReport {
            index: index + 1,
            tab_name: record.tab_name.clone(),
            event_number,
            product,
            outcome,
        });
    }

    let max_row = worksheet.get_highest_row();
    let max_col = worksheet.get_highest_column().max(headers.len() as u32);
    styles::finish_formatting(worksheet, max_row, max_col);

    sheet::save(&book, &options.output)?;

    tracing::info!(
        processed = report.processed,
        updated = report.updated,
        added = report.added,
        "export finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_are_ten_points_wide() {
        assert_eq!(similarity_bucket(85.3), "80-89%");
        assert_eq!(similarity_bucket(100.0), "100-109%");
        assert_eq!(similarity_bucket(0.0), "0-9%");
    }
}
