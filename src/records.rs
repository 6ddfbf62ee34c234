//! Input model: contract records grouped by event, and the per-event context
//! that fills in shared fields.

use crate::amount_words::{amount_to_short_text, amount_to_words, capitalize_first};
use crate::errors::LedgerError;
use crate::fields::{EVENT_NAME_KEY, EVENT_NUMBER_KEY, FieldTable, HeaderSpec, convert_to_number};
use crate::reconcile::ColumnLayout;
use crate::sheet::CellValue;
use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const COMMON_FIELDS: [&str; 3] = ["захід", "дата", "адреса"];

pub const QUANTITY_KEY: &str = "кількість";
pub const UNIT_PRICE_KEY: &str = "ціна за одиницю";
const TOTAL_KEYS: [&str; 2] = ["разом", "загальна сума"];
const SHORT_AMOUNT_KEY: &str = "сума";
const AMOUNT_WORDS_KEY: &str = "сума прописом";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContractRecord {
    pub tab_name: String,
    pub event_number: Option<String>,
    pub entries: IndexMap<String, String>,
}

impl ContractRecord {
    pub fn new(tab_name: impl Into<String>) -> Self {
        Self {
            tab_name: tab_name.into(),
            ..Self::default()
        }
    }

    pub fn with_event_number(mut self, number: impl Into<String>) -> Self {
        self.event_number = Some(number.into());
        self
    }

    pub fn with_entry(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(normalize_key(key), value.into());
        self
    }

    pub fn entry(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Trimmed entry value, `None` when missing or blank.
    pub fn filled(&self, key: &str) -> Option<&str> {
        self.entry(key).map(str::trim).filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventInfo {
    pub name: String,
    pub number: String,
    pub common: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Batch {
    pub events: Vec<EventInfo>,
    pub contracts: Vec<ContractRecord>,
}

#[derive(Debug, Deserialize)]
struct RawBatch {
    #[serde(default)]
    events: Vec<RawEvent>,
    #[serde(default)]
    contracts: Vec<RawContract>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    name: String,
    #[serde(default)]
    number: Option<Value>,
    #[serde(default)]
    common: IndexMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawContract {
    #[serde(default, alias = "event_name")]
    tab_name: String,
    #[serde(default)]
    event_number: Option<Value>,
    #[serde(default)]
    entries: IndexMap<String, Value>,
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

fn map_entries(raw: IndexMap<String, Value>) -> IndexMap<String, String> {
    raw.into_iter()
        .map(|(key, value)| (normalize_key(&key), value_to_string(value)))
        .collect()
}

impl Batch {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("batch file {:?} does not exist", path);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read batch file {:?}", path))?;
        let batch = Self::from_json(&contents)
            .map_err(|err| LedgerError::batch_load(path.display().to_string(), err))?;
        tracing::info!(
            path = %path.display(),
            events = batch.events.len(),
            contracts = batch.contracts.len(),
            "batch loaded"
        );
        Ok(batch)
    }

    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        let raw: RawBatch = serde_json::from_str(contents)?;
        let events = raw
            .events
            .into_iter()
            .map(|event| EventInfo {
                name: event.name,
                number: event.number.map(value_to_string).unwrap_or_default(),
                common: map_entries(event.common),
            })
            .collect();
        let contracts = raw
            .contracts
            .into_iter()
            .map(|contract| ContractRecord {
                tab_name: contract.tab_name,
                event_number: contract.event_number.map(value_to_string),
                entries: map_entries(contract.entries),
            })
            .collect();
        Ok(Self { events, contracts })
    }

    /// Union of entry keys across all contracts, in first-seen order.
    pub fn fields_list(&self) -> Vec<String> {
        fields_list(&self.contracts)
    }
}

pub fn fields_list(records: &[ContractRecord]) -> Vec<String> {
    let mut keys = IndexSet::new();
    for record in records {
        for key in record.entries.keys() {
            keys.insert(key.clone());
        }
    }
    keys.into_iter().collect()
}

/// Per-event lookups for a batch.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    events: IndexMap<String, EventInfo>,
}

impl EventContext {
    pub fn from_events(events: &[EventInfo]) -> Self {
        let events = events
            .iter()
            .map(|event| (event.name.clone(), event.clone()))
            .collect();
        Self { events }
    }

    pub fn event(&self, name: &str) -> Option<&EventInfo> {
        self.events.get(name)
    }

    /// The record's own event number wins, even when blank; otherwise the
    /// number registered for its event.
    pub fn resolve_event_number(&self, record: &ContractRecord) -> String {
        if let Some(number) = &record.event_number {
            return number.clone();
        }
        self.event(&record.tab_name)
            .map(|event| event.number.clone())
            .unwrap_or_default()
    }

    /// Copies the event's shared fields into the record where it has none.
    pub fn apply_common(&self, record: &mut ContractRecord) {
        let Some(event) = self.event(&record.tab_name) else {
            return;
        };
        for key in COMMON_FIELDS {
            let Some(value) = event.common.get(key).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            if record.filled(key).is_none() {
                record.entries.insert(key.to_string(), value.clone());
            }
        }
    }
}

/// Parses a decimal that may use a comma separator or contain spaces.
pub fn parse_decimal(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Fills derived amount fields from quantity and unit price. Values the user
/// already entered are kept.
pub fn derive_amounts(entries: &mut IndexMap<String, String>) {
    let quantity = entries.get(QUANTITY_KEY).and_then(|v| parse_decimal(v));
    let price = entries.get(UNIT_PRICE_KEY).and_then(|v| parse_decimal(v));
    let (Some(quantity), Some(price)) = (quantity, price) else {
        return;
    };
    let total = quantity * price;

    let mut fill = |key: &str, value: String| {
        let blank = entries.get(key).is_none_or(|existing| existing.trim().is_empty());
        if blank {
            entries.insert(key.to_string(), value);
        }
    };

    for key in TOTAL_KEYS {
        fill(key, format!("{total:.2}"));
    }
    if total > 0.0 {
        fill(SHORT_AMOUNT_KEY, amount_to_short_text(total));
        fill(AMOUNT_WORDS_KEY, capitalize_first(&amount_to_words(total)));
    }
}

/// Lays a record out along `headers`. Numeric fields with a value are
/// converted to numbers; everything else stays text.
pub fn build_row(
    headers: &[HeaderSpec],
    record: &ContractRecord,
    event_number: &str,
    table: &FieldTable,
) -> Vec<CellValue> {
    headers
        .iter()
        .map(|header| {
            let raw = match header.key.as_str() {
                EVENT_NUMBER_KEY => event_number,
                EVENT_NAME_KEY => record.tab_name.as_str(),
                key => record.entry(key).unwrap_or_default(),
            };
            if table.is_numeric(&header.key) && !raw.is_empty() {
                convert_to_number(raw)
            } else {
                CellValue::text(raw)
            }
        })
        .collect()
}

/// Product name carried by a laid-out row, empty when there is none.
pub fn product_name(headers: &[HeaderSpec], row: &[CellValue]) -> String {
    ColumnLayout::from_headers(headers)
        .product_col
        .and_then(|idx| row.get(idx))
        .map(CellValue::display)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal_accepts_comma_and_spaces() {
        assert_eq!(parse_decimal("1 250,50"), Some(1250.5));
        assert_eq!(parse_decimal(" 3 "), Some(3.0));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn derive_amounts_keeps_user_values() {
        let mut entries = IndexMap::new();
        entries.insert(QUANTITY_KEY.to_string(), "2".to_string());
        entries.insert(UNIT_PRICE_KEY.to_string(), "10,5".to_string());
        entries.insert("разом".to_string(), "99".to_string());
        derive_amounts(&mut entries);
        assert_eq!(entries["разом"], "99");
        assert_eq!(entries["загальна сума"], "21.00");
        assert_eq!(entries["сума"], "21 грн 00 коп.");
        assert_eq!(entries["сума прописом"], "Двадцять один гривня, 00 копійок.");
    }
}
