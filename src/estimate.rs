//! Budget estimate ("кошторис") built from a batch of contracts.

use crate::amount_words::{amount_to_words, capitalize_first};
use crate::errors::LedgerError;
use crate::fields::HeaderSpec;
use crate::records::{Batch, ContractRecord, EventContext, QUANTITY_KEY, parse_decimal};
use crate::sheet::{self, CellValue};
use crate::styles;
use anyhow::{Result, anyhow};
use serde::Serialize;
use std::path::Path;
use umya_spreadsheet::Worksheet;
use umya_spreadsheet::structs::{HorizontalAlignmentValues, VerticalAlignmentValues};

pub const ESTIMATE_SHEET: &str = "Кошторис";
pub const KEKV_CODE: &str = "2210";
const DEFAULT_UNIT: &str = "шт";

const PRODUCT_FIELDS: [&str; 8] = [
    "товар",
    "назва",
    "найменування",
    "предмет",
    "послуга",
    "робота",
    "матеріал",
    "дк",
];
const PRICE_FIELDS: [&str; 4] = [
    "ціна за одиницю",
    "ціна",
    "вартість за одиницю",
    "вартість одиниці",
];
const UNIT_FIELDS: [&str; 3] = ["одиниця виміру", "од", "шт"];

const TABLE_COLUMNS: [(&str, f64); 6] = [
    ("№", 6.0),
    ("Найменування", 45.0),
    ("Од. виміру", 12.0),
    ("Кількість", 12.0),
    ("Ціна за одиницю", 16.0),
    ("Сума", 16.0),
];
const TABLE_HEADER_ROW: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateItem {
    pub name: String,
    pub unit: String,
    pub quantity: f64,
    pub price: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub event: String,
    pub address: String,
    pub date: String,
    pub items: Vec<EstimateItem>,
    pub grand_total: f64,
    pub total_in_words: String,
}

/// Lenient amount parsing: anything unreadable counts as zero.
pub fn parse_amount(value: &str) -> f64 {
    parse_decimal(value).unwrap_or(0.0)
}

fn first_filled<'a>(record: &'a ContractRecord, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| record.filled(key))
}

pub fn item_from_record(record: &ContractRecord) -> Option<EstimateItem> {
    let name = first_filled(record, &PRODUCT_FIELDS)?;
    let quantity = record.filled(QUANTITY_KEY).map(parse_amount).unwrap_or(0.0);
    let price = first_filled(record, &PRICE_FIELDS)
        .map(parse_amount)
        .unwrap_or(0.0);
    let unit = first_filled(record, &UNIT_FIELDS).unwrap_or(DEFAULT_UNIT);
    Some(EstimateItem {
        name: name.to_string(),
        unit: unit.to_string(),
        quantity,
        price,
        total: quantity * price,
    })
}

/// Contracts with their event's shared fields applied, reduced to estimate
/// lines. Contracts without a product name are skipped.
pub fn collect_items(batch: &Batch) -> Vec<EstimateItem> {
    let context = EventContext::from_events(&batch.events);
    batch
        .contracts
        .iter()
        .filter_map(|contract| {
            let mut record = contract.clone();
            context.apply_common(&mut record);
            let item = item_from_record(&record);
            if item.is_none() {
                tracing::debug!(tab = %record.tab_name, "contract has no product name; skipped");
            }
            item
        })
        .collect()
}

pub fn build_estimate(batch: &Batch) -> Result<Estimate, LedgerError> {
    let Some(first) = batch.contracts.first() else {
        return Err(LedgerError::NothingToEstimate);
    };
    let items = collect_items(batch);
    if items.is_empty() {
        return Err(LedgerError::NothingToEstimate);
    }

    let context = EventContext::from_events(&batch.events);
    let mut head = first.clone();
    context.apply_common(&mut head);

    let grand_total: f64 = items.iter().map(|item| item.total).sum();
    let estimate = Estimate {
        event: head
            .filled("захід")
            .unwrap_or(head.tab_name.as_str())
            .to_string(),
        address: head.filled("адреса").unwrap_or_default().to_string(),
        date: head.filled("дата").unwrap_or_default().to_string(),
        items,
        grand_total,
        total_in_words: capitalize_first(&amount_to_words(grand_total)),
    };
    tracing::info!(
        items = estimate.items.len(),
        total = estimate.grand_total,
        "estimate built"
    );
    Ok(estimate)
}

fn label(sheet: &mut Worksheet, col: u32, row: u32, text: &str, bold: bool) {
    sheet.get_cell_mut((col, row)).set_value_string(text.to_string());
    if bold {
        sheet.get_style_mut((col, row)).get_font_mut().set_bold(true);
    }
}

fn fill_estimate_sheet(sheet: &mut Worksheet, estimate: &Estimate) {
    sheet.set_name(ESTIMATE_SHEET);

    label(sheet, 1, 1, "КОШТОРИС", true);
    sheet.add_merge_cells("A1:F1");
    sheet
        .get_style_mut((1, 1))
        .get_alignment_mut()
        .set_horizontal(HorizontalAlignmentValues::Center);

    for (row, caption, value) in [
        (2, "Захід:", &estimate.event),
        (3, "Адреса:", &estimate.address),
        (4, "Дата:", &estimate.date),
    ] {
        label(sheet, 1, row, caption, true);
        label(sheet, 2, row, value, false);
    }

    let headers: Vec<HeaderSpec> = TABLE_COLUMNS
        .iter()
        .map(|(title, width)| HeaderSpec::new(*title, *title, *width))
        .collect();
    for (idx, header) in headers.iter().enumerate() {
        label(sheet, idx as u32 + 1, TABLE_HEADER_ROW, &header.title, false);
    }
    styles::style_header_cells(sheet, TABLE_HEADER_ROW, headers.len() as u32);
    styles::set_column_widths(sheet, &headers);

    let mut row = TABLE_HEADER_ROW;
    for (idx, item) in estimate.items.iter().enumerate() {
        row += 1;
        let values = [
            CellValue::Number((idx + 1) as f64),
            CellValue::text(item.name.clone()),
            CellValue::text(item.unit.clone()),
            CellValue::Number(item.quantity),
            CellValue::Number(item.price),
            CellValue::Number(round_kopecks(item.total)),
        ];
        for (col, value) in values.iter().enumerate() {
            sheet::write_cell(sheet, col as u32 + 1, row, value);
        }
    }

    row += 1;
    label(sheet, 2, row, "Разом", true);
    sheet::write_cell(sheet, 6, row, &CellValue::Number(round_kopecks(estimate.grand_total)));
    sheet.get_style_mut((6, row)).get_font_mut().set_bold(true);

    row += 1;
    label(sheet, 2, row, "у т. ч. за КЕКВ:", false);
    label(sheet, 5, row, KEKV_CODE, false);
    sheet::write_cell(sheet, 6, row, &CellValue::Number(round_kopecks(estimate.grand_total)));
    let table_end = row;

    for r in TABLE_HEADER_ROW + 1..=table_end {
        for col in 1..=TABLE_COLUMNS.len() as u32 {
            let style = sheet.get_style_mut((col, r));
            styles::apply_thin_border(style);
            style
                .get_alignment_mut()
                .set_vertical(VerticalAlignmentValues::Center);
        }
    }

    row += 2;
    label(sheet, 1, row, "Сума прописом:", true);
    label(sheet, 2, row, &estimate.total_in_words, false);
}

fn round_kopecks(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Writes the estimate workbook to `path`, replacing any existing file.
pub fn write_estimate(estimate: &Estimate, path: &Path) -> Result<()> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_mut(&0)
        .ok_or_else(|| anyhow!("new workbook has no worksheet"))?;
    fill_estimate_sheet(sheet, estimate);
    sheet::save(&book, path)?;
    tracing::info!(path = %path.display(), "estimate written");
    Ok(())
}
