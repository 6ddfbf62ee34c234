use assert_matches::assert_matches;
use contract_ledger::fields::{FieldSpec, FieldTable, convert_to_number};
use contract_ledger::sheet::CellValue;
use indexmap::IndexMap;

fn keys(table: &FieldTable, fields: &[&str]) -> Vec<String> {
    table
        .headers_for(fields)
        .into_iter()
        .map(|header| header.key)
        .collect()
}

#[test]
fn reserved_columns_lead_and_fields_follow_configured_order() {
    let table = FieldTable::default();
    let resolved = keys(
        &table,
        &["постачальник", "ціна за одиницю", "товар", "кількість"],
    );
    assert_eq!(
        resolved,
        vec![
            "event_number",
            "event_name",
            "товар",
            "кількість",
            "ціна за одиницю",
            "постачальник"
        ]
    );
}

#[test]
fn unknown_hidden_and_duplicate_fields_are_dropped() {
    let table = FieldTable::default();
    let resolved = keys(
        &table,
        &["товар", "Товар", "невідоме поле", "захід", "event_number", "примітка"],
    );
    assert_eq!(resolved, vec!["event_number", "event_name", "товар"]);
}

#[test]
fn headers_carry_titles_and_widths() {
    let table = FieldTable::default();
    let headers = table.headers_for(&["ціна за одиницю"]);
    assert_eq!(headers[0].title, "Номер заходу");
    assert_eq!(headers[2].title, "Ціна за одиницю");
    assert_eq!(headers[2].width, 16.0);
}

#[test]
fn numeric_detection_uses_keys_case_insensitively() {
    let table = FieldTable::default();
    assert!(table.is_numeric("кількість"));
    assert!(table.is_numeric("Кількість"));
    assert!(table.is_numeric("разом"));
    assert!(table.is_numeric("Ціна за одиницю"));
    assert!(!table.is_numeric("сума"));
    assert!(!table.is_numeric("товар"));
}

#[test]
fn convert_to_number_handles_user_input() {
    assert_eq!(convert_to_number(""), CellValue::Number(0.0));
    assert_eq!(convert_to_number("   "), CellValue::Number(0.0));
    assert_eq!(convert_to_number("'12"), CellValue::Number(12.0));
    assert_eq!(convert_to_number("12,5"), CellValue::Number(12.5));
    assert_eq!(convert_to_number(" 7 "), CellValue::Number(7.0));
    assert_eq!(convert_to_number("7").display(), "7");
}

#[test]
fn unparseable_numbers_pass_through_as_text() {
    assert_matches!(convert_to_number("десять"), CellValue::Text(text) if text == "десять");
    assert_matches!(convert_to_number("1,2,3"), CellValue::Text(text) if text == "1.2.3");
}

#[test]
fn overrides_extend_the_default_table() {
    let mut overrides = IndexMap::new();
    overrides.insert(
        "Примітка".to_string(),
        FieldSpec {
            title: "Коментар".to_string(),
            width: 40.0,
            export: true,
            order: 70,
        },
    );
    let table = FieldTable::with_overrides(overrides, Some(vec!["Кількість".to_string()]));

    let headers = table.headers_for(&["примітка", "товар"]);
    let last = headers.last().expect("at least one header");
    assert_eq!(last.key, "примітка");
    assert_eq!(last.title, "Коментар");
    assert!(table.is_numeric("кількість"));
    assert!(!table.is_numeric("разом"));
}

#[test]
fn reserved_columns_cannot_be_hidden() {
    let mut overrides = IndexMap::new();
    overrides.insert(
        "event_name".to_string(),
        FieldSpec {
            title: "Подія".to_string(),
            width: 20.0,
            export: false,
            order: 2,
        },
    );
    let table = FieldTable::with_overrides(overrides, None);
    let headers = table.headers_for::<&str>(&[]);
    assert_eq!(headers.len(), 2);
    assert_eq!(headers[1].title, "Подія");
}
