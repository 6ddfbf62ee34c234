//! Row reconciliation: decide whether an incoming record updates an existing
//! worksheet row or becomes a new one.

use crate::errors::LedgerError;
use crate::fields::{EVENT_NAME_KEY, EVENT_NUMBER_KEY, FieldTable, HeaderSpec};
use crate::sheet::{self, CellValue};
use crate::similarity::{SimilarityMethod, normalize_text, similarity_score};
use serde::{Deserialize, Serialize};
use umya_spreadsheet::Worksheet;

const EVENT_TITLES: [&str; 3] = ["номер заходу", "номер события", "event_number"];
const PRODUCT_TITLES: [&str; 4] = ["товар", "товару", "product", "продукт"];
const IGNORED_TITLES: [&str; 6] = [
    "номер заходу",
    "назва заходу",
    "номер события",
    "название события",
    "event_number",
    "event_name",
];
pub const PRODUCT_KEY: &str = "товар";
const STATS_EXAMPLE_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum product similarity for a candidate row to count as a match.
    pub match_threshold: f64,
    /// Text changes scoring below this are significant.
    pub significant_below: f64,
    /// Text changes scoring at or above this are minor.
    pub minor_from: f64,
    pub max_significant_pct: f64,
    pub max_combined_pct: f64,
    pub method: SimilarityMethod,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            match_threshold: 80.0,
            significant_below: 70.0,
            minor_from: 90.0,
            max_significant_pct: 30.0,
            max_combined_pct: 60.0,
            method: SimilarityMethod::Fuzzy,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), LedgerError> {
        let checks = [
            ("match_threshold", self.match_threshold),
            ("significant_below", self.significant_below),
            ("minor_from", self.minor_from),
            ("max_significant_pct", self.max_significant_pct),
            ("max_combined_pct", self.max_combined_pct),
        ];
        for (name, value) in checks {
            if !(0.0..=100.0).contains(&value) {
                return Err(LedgerError::InvalidThreshold { name, value });
            }
        }
        if self.significant_below > self.minor_from {
            return Err(LedgerError::InvalidConfig(format!(
                "significant_below ({}) must not exceed minor_from ({})",
                self.significant_below, self.minor_from
            )));
        }
        Ok(())
    }
}

/// Zero-based positions of the columns reconciliation cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub event_col: Option<usize>,
    pub product_col: Option<usize>,
    ignored: Vec<bool>,
}

impl ColumnLayout {
    pub fn from_headers(headers: &[HeaderSpec]) -> Self {
        let title_in = |header: &HeaderSpec, titles: &[&str]| {
            let title = header.title.trim().to_lowercase();
            titles.contains(&title.as_str())
        };

        let event_col = headers
            .iter()
            .position(|h| h.key == EVENT_NUMBER_KEY || title_in(h, &EVENT_TITLES));
        let product_col = headers
            .iter()
            .position(|h| h.key == PRODUCT_KEY || title_in(h, &PRODUCT_TITLES));
        let ignored = headers
            .iter()
            .map(|h| {
                h.key == EVENT_NUMBER_KEY || h.key == EVENT_NAME_KEY || title_in(h, &IGNORED_TITLES)
            })
            .collect();

        Self {
            event_col,
            product_col,
            ignored,
        }
    }

    pub fn is_ignored(&self, idx: usize) -> bool {
        self.ignored.get(idx).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchOutcome {
    NoEventNumber,
    NoMatch,
    Matched { row: u32, similarity: f64 },
}

/// Finds the existing row that best represents (`event_number`, `product_name`).
///
/// Rows are candidates when their event cell equals the event number after
/// trimming. Among candidates the highest product similarity wins and the
/// earliest row wins ties. Without a product column or product name the first
/// candidate is taken at similarity 100.
pub fn find_best_match(
    sheet: &Worksheet,
    layout: &ColumnLayout,
    event_number: &str,
    product_name: &str,
    thresholds: &Thresholds,
) -> MatchOutcome {
    let event_number = event_number.trim();
    if event_number.is_empty() {
        return MatchOutcome::NoEventNumber;
    }

    let max_row = sheet.get_highest_row();
    if max_row < 2 {
        return MatchOutcome::NoMatch;
    }

    let Some(event_col) = layout.event_col else {
        tracing::error!("no event number column in header layout");
        return MatchOutcome::NoMatch;
    };
    let event_col = event_col as u32 + 1;

    let candidates: Vec<u32> = (2..=max_row)
        .filter(|row| sheet::cell_text(sheet, event_col, *row).trim() == event_number)
        .collect();

    if candidates.is_empty() {
        tracing::debug!(event_number, "no rows for event");
        return MatchOutcome::NoMatch;
    }
    tracing::debug!(event_number, candidates = candidates.len(), "candidate rows for event");

    let product_col = match layout.product_col {
        Some(col) if !product_name.is_empty() => col as u32 + 1,
        _ => {
            return MatchOutcome::Matched {
                row: candidates[0],
                similarity: 100.0,
            };
        }
    };

    let mut best: Option<(u32, f64)> = None;
    for row in candidates {
        let existing = sheet::cell_text(sheet, product_col, row);
        let score = similarity_score(&existing, product_name, thresholds.method);
        tracing::debug!(row, existing = %existing, similarity = score, "candidate product");
        if score > best.map(|(_, s)| s).unwrap_or(0.0) {
            best = Some((row, score));
        }
    }

    match best {
        Some((row, similarity)) if similarity >= thresholds.match_threshold => {
            tracing::info!(row, similarity, "matched existing row");
            MatchOutcome::Matched { row, similarity }
        }
        other => {
            tracing::info!(
                best = other.map(|(_, s)| s).unwrap_or(0.0),
                threshold = thresholds.match_threshold,
                "best similarity below threshold"
            );
            MatchOutcome::NoMatch
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChangeKind {
    NoChange,
    #[serde(rename = "minor_text_change")]
    #[strum(serialize = "minor_text_change")]
    MinorText,
    #[serde(rename = "moderate_text_change")]
    #[strum(serialize = "moderate_text_change")]
    ModerateText,
    #[serde(rename = "significant_text_change")]
    #[strum(serialize = "significant_text_change")]
    SignificantText,
    NumericChange,
}

impl ChangeKind {
    pub fn is_significant(self) -> bool {
        matches!(self, Self::SignificantText | Self::NumericChange)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub kind: ChangeKind,
    pub similarity: f64,
}

/// Classifies how much one field moved between the stored and incoming row.
pub fn analyze_field_change(
    old_value: &str,
    new_value: &str,
    header: &HeaderSpec,
    is_numeric: bool,
    thresholds: &Thresholds,
) -> FieldChange {
    let mut change = FieldChange {
        field: header.title.clone(),
        old_value: old_value.to_string(),
        new_value: new_value.to_string(),
        kind: ChangeKind::NoChange,
        similarity: 100.0,
    };

    if normalize_text(old_value) == normalize_text(new_value) {
        return change;
    }

    if is_numeric {
        change.kind = ChangeKind::NumericChange;
        change.similarity = 0.0;
        return change;
    }

    let score = similarity_score(old_value, new_value, thresholds.method);
    change.similarity = score;
    change.kind = if score < thresholds.significant_below {
        ChangeKind::SignificantText
    } else if score < thresholds.minor_from {
        ChangeKind::ModerateText
    } else {
        ChangeKind::MinorText
    };
    change
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Update,
    Append,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Reason {
    NoEventNumber,
    NoMatchFound,
    AcceptableChanges,
    TooManySignificantChanges,
    TooManyTotalChanges,
    OverwriteMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeAnalysis {
    pub significant: usize,
    pub moderate: usize,
    pub minor: usize,
    pub total_fields: usize,
    pub significant_pct: f64,
    pub moderate_pct: f64,
    pub total_changes_pct: f64,
    pub decision: Decision,
    pub reason: Reason,
    /// Only the fields that changed.
    pub changes: Vec<FieldChange>,
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Compares an existing row with an incoming one and decides between
/// updating in place and appending.
pub fn decide(
    existing: &[String],
    incoming: &[String],
    headers: &[HeaderSpec],
    layout: &ColumnLayout,
    table: &FieldTable,
    thresholds: &Thresholds,
) -> ChangeAnalysis {
    let mut significant = 0;
    let mut moderate = 0;
    let mut minor = 0;
    let mut total_fields = 0;
    let mut changes = Vec::new();

    for (idx, header) in headers.iter().enumerate() {
        if layout.is_ignored(idx) {
            continue;
        }
        let (Some(old_value), Some(new_value)) = (existing.get(idx), incoming.get(idx)) else {
            continue;
        };

        total_fields += 1;
        let change = analyze_field_change(
            old_value,
            new_value,
            header,
            table.is_numeric(&header.key),
            thresholds,
        );
        match change.kind {
            ChangeKind::NoChange => continue,
            kind if kind.is_significant() => significant += 1,
            ChangeKind::ModerateText => moderate += 1,
            _ => minor += 1,
        }
        tracing::debug!(
            field = %change.field,
            old = %change.old_value,
            new = %change.new_value,
            kind = %change.kind,
            similarity = change.similarity,
            "field changed"
        );
        changes.push(change);
    }

    let significant_pct = percent(significant, total_fields);
    let moderate_pct = percent(moderate, total_fields);
    let total_changes_pct = percent(significant + moderate + minor, total_fields);

    let (decision, reason) = if significant_pct > thresholds.max_significant_pct {
        (Decision::Append, Reason::TooManySignificantChanges)
    } else if significant_pct + moderate_pct > thresholds.max_combined_pct {
        (Decision::Append, Reason::TooManyTotalChanges)
    } else {
        (Decision::Update, Reason::AcceptableChanges)
    };

    tracing::debug!(
        significant,
        moderate,
        minor,
        total_fields,
        significant_pct,
        decision = ?decision,
        reason = %reason,
        "change analysis"
    );

    ChangeAnalysis {
        significant,
        moderate,
        minor,
        total_fields,
        significant_pct,
        moderate_pct,
        total_changes_pct,
        decision,
        reason,
        changes,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Added,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowOutcome {
    pub action: RowAction,
    pub row: u32,
    pub reason: Reason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ChangeAnalysis>,
}

impl RowOutcome {
    fn added(row: u32, reason: Reason) -> Self {
        Self {
            action: RowAction::Added,
            row,
            reason,
            similarity: None,
            analysis: None,
        }
    }
}

/// Everything `reconcile_row` needs besides the worksheet and the row itself.
pub struct ReconcileContext<'a> {
    pub headers: &'a [HeaderSpec],
    pub layout: &'a ColumnLayout,
    pub table: &'a FieldTable,
    pub thresholds: &'a Thresholds,
}

/// Applies one incoming row to the worksheet, updating the matched row or
/// appending a new one.
pub fn reconcile_row(
    sheet: &mut Worksheet,
    new_row: &[CellValue],
    event_number: &str,
    product_name: &str,
    ctx: &ReconcileContext<'_>,
) -> RowOutcome {
    let outcome = find_best_match(sheet, ctx.layout, event_number, product_name, ctx.thresholds);
    let (matched_row, similarity) = match outcome {
        MatchOutcome::NoEventNumber => {
            tracing::warn!("record has no event number; appending");
            let row = sheet::append_row(sheet, new_row);
            return RowOutcome::added(row, Reason::NoEventNumber);
        }
        MatchOutcome::NoMatch => {
            let row = sheet::append_row(sheet, new_row);
            tracing::info!(event_number, row, "no matching row; appended");
            return RowOutcome::added(row, Reason::NoMatchFound);
        }
        MatchOutcome::Matched { row, similarity } => (row, similarity),
    };

    let existing = sheet::read_row(sheet, matched_row, ctx.headers.len());
    let incoming: Vec<String> = new_row.iter().map(CellValue::display).collect();
    let analysis = decide(
        &existing,
        &incoming,
        ctx.headers,
        ctx.layout,
        ctx.table,
        ctx.thresholds,
    );

    let (action, row) = match analysis.decision {
        Decision::Update => {
            sheet::overwrite_row(sheet, matched_row, new_row, ctx.headers);
            (RowAction::Updated, matched_row)
        }
        Decision::Append => (RowAction::Added, sheet::append_row(sheet, new_row)),
    };
    tracing::info!(
        row,
        similarity,
        significant_pct = analysis.significant_pct,
        action = ?action,
        "row reconciled"
    );

    RowOutcome {
        action,
        row,
        reason: analysis.reason,
        similarity: Some(similarity),
        analysis: Some(analysis),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarPair {
    pub left: String,
    pub right: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityReport {
    pub total_products: usize,
    pub total_comparisons: usize,
    pub high_similarity_pairs: usize,
    pub avg_similarity: f64,
    pub max_similarity: f64,
    pub min_similarity: f64,
    pub threshold: f64,
    pub high_similarity_examples: Vec<SimilarPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimilarityStats {
    InsufficientData,
    NoProductColumn,
    InsufficientProducts,
    Success(SimilarityReport),
}

/// Pairwise similarity of the product names already in the worksheet, to
/// help tune `match_threshold`.
pub fn similarity_statistics(
    sheet: &Worksheet,
    headers: &[HeaderSpec],
    threshold: f64,
    method: SimilarityMethod,
) -> SimilarityStats {
    let max_row = sheet.get_highest_row();
    if max_row < 3 {
        return SimilarityStats::InsufficientData;
    }

    let Some(product_col) = ColumnLayout::from_headers(headers).product_col else {
        return SimilarityStats::NoProductColumn;
    };
    let product_col = product_col as u32 + 1;

    let products: Vec<String> = (2..=max_row)
        .map(|row| sheet::cell_text(sheet, product_col, row))
        .filter(|product| !product.is_empty())
        .collect();
    if products.len() < 2 {
        return SimilarityStats::InsufficientProducts;
    }

    let mut pairs = Vec::new();
    for (i, left) in products.iter().enumerate() {
        for right in &products[i + 1..] {
            pairs.push(SimilarPair {
                left: left.clone(),
                right: right.clone(),
                similarity: similarity_score(left, right, method),
            });
        }
    }

    let values: Vec<f64> = pairs.iter().map(|pair| pair.similarity).collect();
    let avg_similarity = values.iter().sum::<f64>() / values.len() as f64;
    let max_similarity = values.iter().copied().fold(f64::MIN, f64::max);
    let min_similarity = values.iter().copied().fold(f64::MAX, f64::min);
    let total_comparisons = pairs.len();

    let high: Vec<SimilarPair> = pairs
        .into_iter()
        .filter(|pair| pair.similarity >= threshold)
        .collect();

    SimilarityStats::Success(SimilarityReport {
        total_products: products.len(),
        total_comparisons,
        high_similarity_pairs: high.len(),
        avg_similarity,
        max_similarity,
        min_similarity,
        threshold,
        high_similarity_examples: high.into_iter().take(STATS_EXAMPLE_LIMIT).collect(),
    })
}
