use rust_xlsxwriter::{Format, Workbook};

use cfs_allocator::cargo::classify::CargoCategory;
use cfs_allocator::data::loader::{load_table_from_path, load_xlsx_bytes};
use cfs_allocator::data::model::{CellValue, Table};
use cfs_allocator::{run_allocation, AllocError, AllocationConfig};

enum Cell<'a> {
    Num(f64),
    Text(&'a str),
    /// Excel serial date.
    Date(f64),
}

fn workbook(headers: &[&str], rows: &[Vec<Cell<'_>>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (row_idx, row) in rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Num(v) => {
                    sheet.write_number(excel_row, col as u16, *v).unwrap();
                }
                Cell::Text(s) => {
                    sheet.write_string(excel_row, col as u16, *s).unwrap();
                }
                Cell::Date(serial) => {
                    sheet
                        .write_number_with_format(excel_row, col as u16, *serial, &date)
                        .unwrap();
                }
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn cfs(rows: &[(f64, f64, f64)]) -> Table {
    let rows: Vec<Vec<Cell<'_>>> = rows
        .iter()
        .map(|&(c, w, v)| vec![Cell::Num(c), Cell::Num(w), Cell::Num(v)])
        .collect();
    load_xlsx_bytes(&workbook(&["CONSOLE NO.", "WEIGHT", "CBM"], &rows)).unwrap()
}

#[test]
fn volumetric_ledger_takes_light_console_and_refuses_heavy_one() {
    let config = AllocationConfig::default();
    // Ledger A: 1000 kg / 5 CBM = 200, volumetric.
    let ledger_a = cfs(&[(1.0, 600.0, 3.0), (2.0, 400.0, 2.0)]);
    // Ledger B is already above the ceiling, so it takes nothing.
    let ledger_b = cfs(&[(50.0, 4000.0, 10.0)]);
    let tracking = cfs(&[(77.0, 5000.0, 1.0), (88.0, 200.0, 1.0)]);

    let run = run_allocation(&config, ledger_a, ledger_b, tracking).unwrap();

    assert_eq!(run.ledgers[0].initial.category, CargoCategory::Volumetric);
    assert_eq!(run.ledgers[0].initial.ratio, 200.0);
    let lines: Vec<String> = run.statements.iter().map(ToString::to_string).collect();
    assert_eq!(lines, vec!["Console 88 should go to TRIWAY CFS"]);

    let a = &run.ledgers[0].ledger;
    assert_eq!(a.total_weight(), 1200.0);
    assert_eq!(a.total_cbm(), 6.0);
    assert_eq!(run.ledgers[1].ledger.len(), 1);
}

#[test]
fn updated_ledger_round_trips_through_xlsx() {
    let config = AllocationConfig::default();
    let ledger_a = load_xlsx_bytes(&workbook(
        &["CONSOLE NO.", "WEIGHT", "CBM", "REMARKS"],
        &[vec![
            Cell::Text("TW-1"),
            Cell::Num(1000.0),
            Cell::Num(5.0),
            Cell::Text("on hold"),
        ]],
    ))
    .unwrap();
    let ledger_b = cfs(&[(9.0, 300.0, 1.0)]);
    let tracking = load_xlsx_bytes(&workbook(
        &["CONSOLE NO.", "WEIGHT", "CBM", "SHIPPER"],
        &[
            vec![Cell::Text("NEW-1"), Cell::Num(120.5), Cell::Num(0.75), Cell::Text("ACME")],
            vec![Cell::Text("NEW-1"), Cell::Num(80.0), Cell::Num(0.25), Cell::Text("ACME")],
        ],
    ))
    .unwrap();

    let run = run_allocation(&config, ledger_a, ledger_b, tracking).unwrap();
    let exports = run.exports().unwrap();
    assert_eq!(exports[0].file_name, "updated_triway_cfs.xlsx");

    let reparsed = load_xlsx_bytes(&exports[0].bytes).unwrap();
    let original = run.ledgers[0].ledger.table();
    assert_eq!(
        reparsed.columns,
        vec!["CONSOLE NO.", "WEIGHT", "CBM", "REMARKS", "SHIPPER"]
    );
    assert_eq!(reparsed.columns, original.columns);
    assert_eq!(reparsed.rows, original.rows);
    assert_eq!(reparsed.rows[1][0], CellValue::String("NEW-1".into()));
    assert_eq!(reparsed.rows[1][3], CellValue::Null);
    assert_eq!(reparsed.rows[2][4], CellValue::String("ACME".into()));
}

#[test]
fn date_columns_from_tracking_sheet_survive_export() {
    let config = AllocationConfig::default();
    let ledger_a = load_xlsx_bytes(&workbook(
        &["CONSOLE NO.", "WEIGHT", "CBM", "ETA"],
        &[vec![Cell::Num(1.0), Cell::Num(1000.0), Cell::Num(5.0), Cell::Date(45480.0)]],
    ))
    .unwrap();
    let tracking = load_xlsx_bytes(&workbook(
        &["CONSOLE NO.", "WEIGHT", "CBM", "ETA"],
        &[vec![Cell::Num(5.0), Cell::Num(100.0), Cell::Num(1.0), Cell::Date(45488.0)]],
    ))
    .unwrap();
    assert_eq!(tracking.rows[0][3], CellValue::Date(45488.0));

    let run = run_allocation(&config, ledger_a, cfs(&[(2.0, 1000.0, 5.0)]), tracking).unwrap();
    assert_eq!(run.statements.len(), 1);

    let exports = run.exports().unwrap();
    let reparsed = load_xlsx_bytes(&exports[0].bytes).unwrap();
    assert_eq!(reparsed.rows, run.ledgers[0].ledger.table().rows);
    assert_eq!(reparsed.rows[1][3], CellValue::Date(45488.0));
    assert_eq!(reparsed.rows[1][3].to_string(), "2024-07-15");
}

#[test]
fn nan_weight_in_csv_ledger_is_an_error() {
    let path = std::env::temp_dir().join(format!(
        "cfs_allocator_nan_ledger_{}.csv",
        std::process::id()
    ));
    std::fs::write(&path, "CONSOLE NO.,WEIGHT,CBM\n1,1000,5\n2,NaN,1\n").unwrap();
    let ledger_a = load_table_from_path(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let err = run_allocation(
        &AllocationConfig::default(),
        ledger_a,
        cfs(&[(3.0, 1000.0, 5.0)]),
        cfs(&[(5.0, 10.0, 1.0)]),
    )
    .unwrap_err();
    match err {
        AllocError::InvalidNumber { row, column, value } => {
            assert_eq!(row, 3);
            assert_eq!(column, "WEIGHT");
            assert_eq!(value, "NaN");
        }
        other => panic!("expected InvalidNumber, got {other:?}"),
    }
}

#[test]
fn each_console_lands_in_at_most_one_ledger() {
    let config = AllocationConfig::default();
    let ledger_a = cfs(&[(1.0, 1000.0, 5.0)]);
    let ledger_b = cfs(&[(2.0, 1000.0, 5.0)]);
    let rows: Vec<(f64, f64, f64)> = (0..40)
        .map(|i| (100.0 + (i % 13) as f64, 50.0 + 40.0 * (i % 7) as f64, 0.5))
        .collect();
    let tracking = cfs(&rows);

    let run = run_allocation(&config, ledger_a, ledger_b, tracking).unwrap();

    let mut seen = std::collections::BTreeSet::new();
    for statement in &run.statements {
        assert!(
            seen.insert(statement.console.clone()),
            "console {} assigned twice",
            statement.console
        );
    }
    for report in &run.ledgers {
        let summary = report.ledger.summary(&config.thresholds).unwrap();
        assert!(summary.ratio <= config.max_ratio);
    }
}

#[test]
fn renamed_column_is_reported() {
    let config = AllocationConfig::default();
    let bad = load_xlsx_bytes(&workbook(
        &["CONSOLE NO", "WEIGHT", "CBM"],
        &[vec![Cell::Num(1.0), Cell::Num(1.0), Cell::Num(1.0)]],
    ))
    .unwrap();
    let err = run_allocation(&config, bad, cfs(&[(2.0, 1.0, 1.0)]), cfs(&[])).unwrap_err();
    match err {
        AllocError::MissingColumn { column, available } => {
            assert_eq!(column, "CONSOLE NO.");
            assert_eq!(available[0], "CONSOLE NO");
        }
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn csv_tracking_sheet_matches_xlsx_console_numbers() {
    let path = std::env::temp_dir().join(format!(
        "cfs_allocator_tracking_{}.csv",
        std::process::id()
    ));
    std::fs::write(&path, "CONSOLE NO.,WEIGHT,CBM\n1,10,1\n3,100,1\n").unwrap();
    let tracking = load_table_from_path(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let config = AllocationConfig::default();
    let run = run_allocation(
        &config,
        cfs(&[(1.0, 1000.0, 5.0)]),
        cfs(&[(2.0, 1000.0, 5.0)]),
        tracking,
    )
    .unwrap();

    // Console 1 from the CSV is the same console as 1.0 in the xlsx ledger.
    let lines: Vec<String> = run.statements.iter().map(ToString::to_string).collect();
    assert_eq!(lines, vec!["Console 3 should go to TRIWAY CFS"]);
}
