#![allow(dead_code)]
use contract_ledger::fields::{FieldTable, HeaderSpec};
use contract_ledger::records::{Batch, ContractRecord, EventInfo};
use contract_ledger::sheet::{self, CellValue};
use indexmap::IndexMap;
use std::path::Path;
use umya_spreadsheet::{Spreadsheet, Worksheet};

pub const SHEET_NAME: &str = "База даних";

/// Column keys used by most reconciliation fixtures: two reserved columns
/// followed by five compared fields.
pub const FIXTURE_KEYS: [&str; 5] = [
    "товар",
    "кількість",
    "одиниця виміру",
    "ціна за одиницю",
    "постачальник",
];

pub fn fixture_headers(table: &FieldTable) -> Vec<HeaderSpec> {
    table.headers_for(&FIXTURE_KEYS)
}

pub fn contract(
    tab: &str,
    number: &str,
    product: &str,
    quantity: &str,
    unit: &str,
    price: &str,
    supplier: &str,
) -> ContractRecord {
    ContractRecord::new(tab)
        .with_event_number(number)
        .with_entry("товар", product)
        .with_entry("кількість", quantity)
        .with_entry("одиниця виміру", unit)
        .with_entry("ціна за одиницю", price)
        .with_entry("постачальник", supplier)
}

pub fn football_contract() -> ContractRecord {
    contract(
        "Кубок міста з футболу",
        "12",
        "М'ячі футбольні Select",
        "10",
        "шт",
        "850",
        "ТОВ Спорт-Інвентар",
    )
}

pub fn volleyball_contract() -> ContractRecord {
    contract(
        "Кубок міста з футболу",
        "12",
        "Сітка волейбольна",
        "2",
        "шт",
        "1200,50",
        "ФОП Петренко",
    )
}

pub fn swimming_contract() -> ContractRecord {
    contract(
        "Чемпіонат з плавання",
        "15",
        "Доріжки для басейну",
        "8",
        "шт",
        "3100",
        "ТОВ Аква",
    )
}

pub fn event(name: &str, number: &str, date: &str, address: &str) -> EventInfo {
    let mut common = IndexMap::new();
    common.insert("захід".to_string(), name.to_string());
    common.insert("дата".to_string(), date.to_string());
    common.insert("адреса".to_string(), address.to_string());
    EventInfo {
        name: name.to_string(),
        number: number.to_string(),
        common,
    }
}

pub fn sample_batch() -> Batch {
    Batch {
        events: vec![
            event("Кубок міста з футболу", "12", "15.06.2025", "м. Київ, вул. Спортивна, 1"),
            event("Чемпіонат з плавання", "15", "20.07.2025", "м. Київ, басейн Юність"),
        ],
        contracts: vec![football_contract(), volleyball_contract(), swimming_contract()],
    }
}

/// A database workbook with the standard header row and the given records
/// laid out as data rows.
pub fn database_with(table: &FieldTable, records: &[ContractRecord]) -> (Spreadsheet, Vec<HeaderSpec>) {
    let headers = fixture_headers(table);
    let mut book = sheet::create_new(&headers, SHEET_NAME);
    {
        let worksheet = first_sheet_mut(&mut book);
        for record in records {
            let number = record.event_number.clone().unwrap_or_default();
            let row = contract_ledger::records::build_row(&headers, record, &number, table);
            sheet::append_row(worksheet, &row);
        }
    }
    (book, headers)
}

pub fn first_sheet_mut(book: &mut Spreadsheet) -> &mut Worksheet {
    book.get_sheet_mut(&0).expect("workbook has a first sheet")
}

pub fn first_sheet(book: &Spreadsheet) -> &Worksheet {
    book.get_sheet(&0).expect("workbook has a first sheet")
}

pub fn fill_rows(sheet: &mut Worksheet, titles: &[&str], rows: &[Vec<CellValue>]) {
    for (idx, title) in titles.iter().enumerate() {
        sheet
            .get_cell_mut((idx as u32 + 1, 1))
            .set_value(title.to_string());
    }
    for (row_idx, values) in rows.iter().enumerate() {
        for (col_idx, value) in values.iter().enumerate() {
            sheet::write_cell(sheet, col_idx as u32 + 1, row_idx as u32 + 2, value);
        }
    }
}

pub fn text(value: &str) -> CellValue {
    CellValue::text(value)
}

pub fn read_workbook(path: &Path) -> Spreadsheet {
    umya_spreadsheet::reader::xlsx::read(path).expect("read workbook")
}

pub fn write_batch_json(path: &Path, batch: &serde_json::Value) {
    std::fs::write(path, serde_json::to_string_pretty(batch).expect("serialize batch"))
        .expect("write batch file");
}

pub fn sample_batch_json() -> serde_json::Value {
    serde_json::json!({
        "events": [
            {
                "name": "Кубок міста з футболу",
                "number": "12",
                "common": {"захід": "Кубок міста з футболу", "дата": "15.06.2025", "адреса": "м. Київ"}
            },
            {
                "name": "Чемпіонат з плавання",
                "number": 15,
                "common": {"дата": "20.07.2025"}
            }
        ],
        "contracts": [
            {
                "tab_name": "Кубок міста з футболу",
                "entries": {
                    "Товар": "М'ячі футбольні Select",
                    "кількість": 10,
                    "одиниця виміру": "шт",
                    "ціна за одиницю": "850",
                    "постачальник": "ТОВ Спорт-Інвентар"
                }
            },
            {
                "tab_name": "Кубок міста з футболу",
                "entries": {
                    "товар": "Сітка волейбольна",
                    "кількість": "2",
                    "ціна за одиницю": "1200,50",
                    "постачальник": "ФОП Петренко"
                }
            },
            {
                "tab_name": "Чемпіонат з плавання",
                "entries": {
                    "товар": "Доріжки для басейну",
                    "кількість": "8",
                    "ціна за одиницю": "3100",
                    "постачальник": "ТОВ Аква"
                }
            }
        ]
    })
}
