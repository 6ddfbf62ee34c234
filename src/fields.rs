//! Field table: which record keys become columns, under which title, at
//! which width and in which order.

use crate::sheet::CellValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const EVENT_NUMBER_KEY: &str = "event_number";
pub const EVENT_NAME_KEY: &str = "event_name";
pub const BASE_KEYS: [&str; 2] = [EVENT_NUMBER_KEY, EVENT_NAME_KEY];

pub const DEFAULT_COLUMN_WIDTH: f64 = 15.0;
const UNORDERED: u32 = 999;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub title: String,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_export")]
    pub export: bool,
    #[serde(default = "default_order")]
    pub order: u32,
}

fn default_width() -> f64 {
    DEFAULT_COLUMN_WIDTH
}

fn default_export() -> bool {
    true
}

fn default_order() -> u32 {
    UNORDERED
}

impl FieldSpec {
    fn new(title: &str, width: f64, export: bool, order: u32) -> Self {
        Self {
            title: title.to_string(),
            width,
            export,
            order,
        }
    }
}

/// One resolved worksheet column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderSpec {
    pub key: String,
    pub title: String,
    pub width: f64,
    #[serde(skip)]
    order: u32,
}

impl HeaderSpec {
    pub fn new(key: impl Into<String>, title: impl Into<String>, width: f64) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            width,
            order: UNORDERED,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldTable {
    specs: IndexMap<String, FieldSpec>,
    numeric: BTreeSet<String>,
}

impl Default for FieldTable {
    fn default() -> Self {
        let specs = [
            (EVENT_NUMBER_KEY, FieldSpec::new("Номер заходу", 15.0, true, 1)),
            (EVENT_NAME_KEY, FieldSpec::new("Назва заходу", 35.0, true, 2)),
            ("дата", FieldSpec::new("Дата", 14.0, true, 3)),
            ("адреса", FieldSpec::new("Адреса", 35.0, true, 4)),
            ("дк", FieldSpec::new("ДК 021:2015", 25.0, true, 8)),
            ("товар", FieldSpec::new("Товар", 40.0, true, 10)),
            ("кількість", FieldSpec::new("Кількість", 12.0, true, 20)),
            ("одиниця виміру", FieldSpec::new("Од. виміру", 12.0, true, 21)),
            ("ціна за одиницю", FieldSpec::new("Ціна за одиницю", 16.0, true, 22)),
            ("разом", FieldSpec::new("Разом", 15.0, true, 23)),
            ("загальна сума", FieldSpec::new("Загальна сума", 16.0, true, 24)),
            ("сума", FieldSpec::new("Сума", 22.0, true, 25)),
            ("сума прописом", FieldSpec::new("Сума прописом", 50.0, true, 26)),
            ("постачальник", FieldSpec::new("Постачальник", 30.0, true, 30)),
            ("єдрпоу", FieldSpec::new("ЄДРПОУ", 14.0, true, 31)),
            ("адреса постачальника", FieldSpec::new("Адреса постачальника", 35.0, true, 32)),
            ("номер договору", FieldSpec::new("Номер договору", 16.0, true, 40)),
            ("дата договору", FieldSpec::new("Дата договору", 14.0, true, 41)),
            ("захід", FieldSpec::new("Захід", 35.0, false, 50)),
            ("примітка", FieldSpec::new("Примітка", 30.0, false, 60)),
        ]
        .into_iter()
        .map(|(key, spec)| (key.to_string(), spec))
        .collect();

        let numeric = ["кількість", "ціна за одиницю", "загальна сума", "разом"]
            .into_iter()
            .map(str::to_string)
            .collect();

        Self { specs, numeric }
    }
}

impl FieldTable {
    /// Builds a table from explicit field specs. Keys are lowercased and the
    /// two reserved columns are added back when missing.
    pub fn from_parts(
        specs: IndexMap<String, FieldSpec>,
        numeric: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut specs: IndexMap<String, FieldSpec> = specs
            .into_iter()
            .map(|(key, spec)| (key.trim().to_lowercase(), spec))
            .collect();

        let defaults = Self::default();
        for key in BASE_KEYS {
            match specs.get_mut(key) {
                Some(spec) => spec.export = true,
                None => {
                    if let Some(spec) = defaults.specs.get(key) {
                        specs.insert(key.to_string(), spec.clone());
                    }
                }
            }
        }

        let numeric = numeric
            .into_iter()
            .map(|key| key.trim().to_lowercase())
            .filter(|key| !key.is_empty())
            .collect();

        Self { specs, numeric }
    }

    /// The default table with `overrides` merged over it.
    pub fn with_overrides(
        overrides: IndexMap<String, FieldSpec>,
        numeric: Option<Vec<String>>,
    ) -> Self {
        let defaults = Self::default();
        let mut specs = defaults.specs.clone();
        for (key, spec) in overrides {
            specs.insert(key.trim().to_lowercase(), spec);
        }
        let numeric = numeric.unwrap_or_else(|| defaults.numeric.iter().cloned().collect());
        Self::from_parts(specs, numeric)
    }

    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.specs.get(&key.to_lowercase())
    }

    pub fn is_exportable(&self, key: &str) -> bool {
        self.get(key).map(|spec| spec.export).unwrap_or(false)
    }

    pub fn is_numeric(&self, key: &str) -> bool {
        self.numeric.contains(&key.to_lowercase())
    }

    pub fn numeric_keys(&self) -> impl Iterator<Item = &str> {
        self.numeric.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    fn header(&self, key: &str) -> Option<HeaderSpec> {
        self.get(key).map(|spec| HeaderSpec {
            key: key.to_lowercase(),
            title: spec.title.clone(),
            width: spec.width,
            order: spec.order,
        })
    }

    /// Column layout for a batch whose records use `fields_list` keys.
    ///
    /// The reserved columns always come first; remaining keys are kept only
    /// when the table exports them. The result is stably sorted by `order`.
    pub fn headers_for<S: AsRef<str>>(&self, fields_list: &[S]) -> Vec<HeaderSpec> {
        let mut headers: Vec<HeaderSpec> =
            BASE_KEYS.iter().filter_map(|key| self.header(key)).collect();
        let mut seen: BTreeSet<String> = BASE_KEYS.iter().map(|key| key.to_string()).collect();

        for field in fields_list {
            let key = field.as_ref().trim().to_lowercase();
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }
            if !self.is_exportable(&key) {
                tracing::debug!(field = %key, "field excluded from export");
                continue;
            }
            if let Some(header) = self.header(&key) {
                headers.push(header);
            }
        }

        headers.sort_by_key(|header| header.order);
        tracing::debug!(
            columns = headers.len(),
            keys = ?headers.iter().map(|h| h.key.as_str()).collect::<Vec<_>>(),
            "resolved header layout"
        );
        headers
    }
}

/// Coerces a numeric field's text into a cell number.
///
/// Blank input becomes `0`. A value that still does not parse is passed
/// through as text.
pub fn convert_to_number(value: &str) -> CellValue {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return CellValue::Number(0.0);
    }
    let cleaned = trimmed.strip_prefix('\'').unwrap_or(trimmed).replace(',', ".");
    match cleaned.parse::<f64>() {
        Ok(number) if number.is_finite() => CellValue::Number(number),
        _ => {
            tracing::warn!(value = %value, "could not convert value to a number");
            CellValue::Text(cleaned)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_keys_survive_custom_tables() {
        let table = FieldTable::from_parts(IndexMap::new(), Vec::new());
        let headers = table.headers_for::<&str>(&[]);
        let keys: Vec<&str> = headers.iter().map(|h| h.key.as_str()).collect();
        assert_eq!(keys, vec![EVENT_NUMBER_KEY, EVENT_NAME_KEY]);
    }
}
