mod support;

use assert_matches::assert_matches;
use contract_ledger::errors::LedgerError;
use contract_ledger::estimate::{
    ESTIMATE_SHEET, KEKV_CODE, build_estimate, collect_items, item_from_record, write_estimate,
};
use contract_ledger::records::{Batch, ContractRecord};
use contract_ledger::sheet;
use support::*;

fn awards_batch() -> Batch {
    Batch {
        events: vec![event(
            "Турнір з боксу",
            "21",
            "03.10.2025",
            "м. Львів, вул. Городоцька, 5",
        )],
        contracts: vec![
            ContractRecord::new("Турнір з боксу")
                .with_entry("товар", "Медалі")
                .with_entry("кількість", "25")
                .with_entry("одиниця виміру", "шт")
                .with_entry("ціна за одиницю", "100,20"),
            ContractRecord::new("Турнір з боксу")
                .with_entry("назва", "Кубки")
                .with_entry("кількість", "3")
                .with_entry("ціна", "800"),
        ],
    }
}

#[test]
fn estimate_sums_items_and_spells_total() {
    let estimate = build_estimate(&awards_batch()).expect("estimate");

    assert_eq!(estimate.event, "Турнір з боксу");
    assert_eq!(estimate.address, "м. Львів, вул. Городоцька, 5");
    assert_eq!(estimate.date, "03.10.2025");
    assert_eq!(estimate.items.len(), 2);
    assert!((estimate.items[0].total - 2505.0).abs() < 1e-6);
    assert!((estimate.grand_total - 4905.0).abs() < 1e-6);
    assert_eq!(
        estimate.total_in_words,
        "Чотири тисячі дев'ятсот п'ять гривень, 00 копійок."
    );
}

#[test]
fn item_fields_fall_back_to_alternate_keys() {
    let record = ContractRecord::new("Турнір")
        .with_entry("назва", "Кубки")
        .with_entry("кількість", "3")
        .with_entry("ціна", "800");
    let item = item_from_record(&record).expect("item");
    assert_eq!(item.name, "Кубки");
    assert_eq!(item.unit, "шт");
    assert_eq!(item.price, 800.0);
    assert_eq!(item.total, 2400.0);

    let unreadable = ContractRecord::new("Турнір")
        .with_entry("товар", "Рушники")
        .with_entry("кількість", "багато");
    let item = item_from_record(&unreadable).expect("item");
    assert_eq!(item.quantity, 0.0);
    assert_eq!(item.total, 0.0);

    assert!(item_from_record(&ContractRecord::new("Турнір").with_entry("товар", "  ")).is_none());
}

#[test]
fn event_name_falls_back_to_tab_name() {
    let batch = Batch {
        events: Vec::new(),
        contracts: vec![
            ContractRecord::new("Легкоатлетичний забіг")
                .with_entry("товар", "Номери учасників")
                .with_entry("кількість", "100")
                .with_entry("ціна за одиницю", "4,5"),
        ],
    };
    let estimate = build_estimate(&batch).expect("estimate");
    assert_eq!(estimate.event, "Легкоатлетичний забіг");
    assert_eq!(estimate.address, "");
    assert_eq!(estimate.total_in_words, "Чотириста п'ятдесят гривень, 00 копійок.");
}

#[test]
fn nothing_to_estimate_is_an_error() {
    assert_matches!(
        build_estimate(&Batch::default()),
        Err(LedgerError::NothingToEstimate)
    );

    let unnamed = Batch {
        events: Vec::new(),
        contracts: vec![ContractRecord::new("Турнір").with_entry("кількість", "2")],
    };
    assert!(collect_items(&unnamed).is_empty());
    assert_matches!(build_estimate(&unnamed), Err(LedgerError::NothingToEstimate));
}

#[test]
fn estimate_workbook_lays_out_table_and_totals() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("кошторис.xlsx");
    let estimate = build_estimate(&awards_batch()).expect("estimate");

    write_estimate(&estimate, &path).expect("write estimate");

    let book = read_workbook(&path);
    let worksheet = first_sheet(&book);
    assert_eq!(worksheet.get_name(), ESTIMATE_SHEET);
    assert_eq!(sheet::cell_text(worksheet, 1, 1), "КОШТОРИС");
    assert_eq!(sheet::cell_text(worksheet, 2, 2), "Турнір з боксу");
    assert_eq!(sheet::cell_text(worksheet, 1, 6), "№");
    assert_eq!(sheet::cell_text(worksheet, 2, 6), "Найменування");

    assert_eq!(sheet::cell_text(worksheet, 1, 7), "1");
    assert_eq!(sheet::cell_text(worksheet, 2, 7), "Медалі");
    assert_eq!(sheet::cell_text(worksheet, 6, 7), "2505");
    assert_eq!(sheet::cell_text(worksheet, 2, 8), "Кубки");
    assert_eq!(sheet::cell_text(worksheet, 3, 8), "шт");

    assert_eq!(sheet::cell_text(worksheet, 2, 9), "Разом");
    assert_eq!(sheet::cell_text(worksheet, 6, 9), "4905");
    assert_eq!(sheet::cell_text(worksheet, 5, 10), KEKV_CODE);
    assert_eq!(sheet::cell_text(worksheet, 6, 10), "4905");
    assert_eq!(sheet::cell_text(worksheet, 1, 12), "Сума прописом:");
    assert_eq!(
        sheet::cell_text(worksheet, 2, 12),
        "Чотири тисячі дев'ятсот п'ять гривень, 00 копійок."
    );
}
