//! End-to-end run over three parsed sheets: two CFS ledgers and a cargo
//! tracking sheet. No I/O happens here; callers load the tables and decide
//! what to do with the exported bytes.

use crate::cargo::allocate::{allocate, AllocationStatement};
use crate::cargo::ledger::{aggregate, Aggregate, Ledger};
use crate::config::{AllocationConfig, LedgerSlot};
use crate::data::export::table_to_xlsx;
use crate::data::filter::{filter_unassigned, used_consoles};
use crate::data::model::Table;
use crate::error::Result;

/// A ledger as uploaded plus its density before allocation.
#[derive(Debug, Clone)]
pub struct LedgerReport {
    pub slot: LedgerSlot,
    /// Totals, ratio and category of the uploaded file.
    pub initial: Aggregate,
    /// The ledger after allocation.
    pub ledger: Ledger,
}

impl LedgerReport {
    /// e.g. `TRIWAY CFS Cargo Type: Volumetric Cargo (200.00 kg/CBM)`
    pub fn describe(&self) -> String {
        format!(
            "{} Cargo Type: {} ({:.2} kg/CBM)",
            self.slot.label, self.initial.category, self.initial.ratio
        )
    }
}

/// A spreadsheet ready to be offered for download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedLedger {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Everything one allocation run produced.
#[derive(Debug, Clone)]
pub struct AllocationRun {
    pub ledgers: [LedgerReport; 2],
    /// Ledger A's statements followed by ledger B's.
    pub statements: Vec<AllocationStatement>,
    preview_len: usize,
}

impl AllocationRun {
    /// The statements the boundary layer shows.
    pub fn preview(&self) -> &[AllocationStatement] {
        let n = self.preview_len.min(self.statements.len());
        &self.statements[..n]
    }

    /// Serialize both updated ledgers as `updated_<slug>_cfs.xlsx`.
    pub fn exports(&self) -> Result<Vec<ExportedLedger>> {
        self.ledgers
            .iter()
            .map(|report| {
                Ok(ExportedLedger {
                    file_name: report.slot.export_file_name(),
                    bytes: table_to_xlsx(report.ledger.table())?,
                })
            })
            .collect()
    }
}

/// Wrap an uploaded ledger sheet and compute its density.
pub fn open_ledger(
    slot: &LedgerSlot,
    table: Table,
    config: &AllocationConfig,
) -> Result<(Ledger, Aggregate)> {
    let ledger = Ledger::from_table(&slot.label, table)?;
    let summary = aggregate(ledger.records(), &config.thresholds)?;
    log::info!(
        "{}: {} records, {:.2} kg / {:.3} CBM, {} ({:.2} kg/CBM)",
        slot.label,
        ledger.len(),
        summary.total_weight,
        summary.total_cbm,
        summary.category,
        summary.ratio
    );
    Ok((ledger, summary))
}

/// Allocate unassigned tracking-sheet consoles to ledger A, then ledger B.
///
/// Consoles already present in either ledger are filtered out first. Both
/// allocator calls share one used-console set, so a console lands in at most
/// one ledger. Any error aborts the whole run.
pub fn run_allocation(
    config: &AllocationConfig,
    ledger_a: Table,
    ledger_b: Table,
    tracking: Table,
) -> Result<AllocationRun> {
    config.validate()?;
    let [slot_a, slot_b] = &config.ledgers;

    let (mut a, initial_a) = open_ledger(slot_a, ledger_a, config)?;
    let (mut b, initial_b) = open_ledger(slot_b, ledger_b, config)?;

    let candidates = tracking.records()?;
    let mut used = used_consoles([a.records(), b.records()]);
    let pool = filter_unassigned(&candidates, &used);
    log::info!(
        "Tracking sheet: {} rows, {} not yet in any ledger",
        candidates.len(),
        pool.len()
    );

    let mut statements = allocate(&mut a, &tracking, &pool, config.max_ratio, &mut used)?;
    statements.extend(allocate(
        &mut b,
        &tracking,
        &pool,
        config.max_ratio,
        &mut used,
    )?);

    Ok(AllocationRun {
        ledgers: [
            LedgerReport {
                slot: slot_a.clone(),
                initial: initial_a,
                ledger: a,
            },
            LedgerReport {
                slot: slot_b.clone(),
                initial: initial_b,
                ledger: b,
            },
        ],
        statements,
        preview_len: config.statement_preview,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cargo::classify::CargoCategory;
    use crate::data::model::{CellValue, CBM_COLUMN, CONSOLE_COLUMN, WEIGHT_COLUMN};
    use crate::error::AllocError;

    fn sheet(rows: &[(i64, f64, f64)]) -> Table {
        let mut table = Table::new(vec![
            CONSOLE_COLUMN.to_string(),
            WEIGHT_COLUMN.to_string(),
            CBM_COLUMN.to_string(),
        ]);
        for &(console, weight, cbm) in rows {
            table.push_row(vec![
                CellValue::Integer(console),
                CellValue::Float(weight),
                CellValue::Float(cbm),
            ]);
        }
        table
    }

    #[test]
    fn consoles_already_in_a_ledger_are_not_offered() {
        let config = AllocationConfig::default();
        let a = sheet(&[(1, 1000.0, 5.0)]);
        let b = sheet(&[(2, 500.0, 5.0)]);
        let tracking = sheet(&[(1, 10.0, 1.0), (2, 10.0, 1.0), (3, 10.0, 1.0)]);

        let run = run_allocation(&config, a, b, tracking).unwrap();
        let consoles: Vec<String> = run.statements.iter().map(|s| s.console.to_string()).collect();
        assert_eq!(consoles, vec!["3"]);
        assert_eq!(run.statements[0].ledger, "TRIWAY CFS");
    }

    #[test]
    fn ledger_b_gets_what_ledger_a_refused() {
        let config = AllocationConfig::default();
        // A is already at 340; B at 100.
        let a = sheet(&[(1, 3400.0, 10.0)]);
        let b = sheet(&[(2, 1000.0, 10.0)]);
        // 9: 1000/1 pushes A to 4400/11 = 400 > 350, B to 2000/11 = 181.8.
        let tracking = sheet(&[(9, 1000.0, 1.0)]);

        let run = run_allocation(&config, a, b, tracking).unwrap();
        assert_eq!(run.statements.len(), 1);
        assert_eq!(
            run.statements[0].to_string(),
            "Console 9 should go to THIRURANI CFS"
        );
        assert_eq!(run.ledgers[0].ledger.len(), 1);
        assert_eq!(run.ledgers[1].ledger.len(), 2);
    }

    #[test]
    fn no_console_is_assigned_twice() {
        let config = AllocationConfig::default();
        let a = sheet(&[(1, 1000.0, 5.0)]);
        let b = sheet(&[(2, 1000.0, 5.0)]);
        let tracking = sheet(&[(3, 100.0, 1.0), (4, 100.0, 1.0), (3, 50.0, 0.5)]);

        let run = run_allocation(&config, a, b, tracking).unwrap();
        assert_eq!(run.statements.len(), 2);
        assert!(run.statements.iter().all(|s| s.ledger == "TRIWAY CFS"));
        assert_eq!(run.ledgers[1].ledger.len(), 1);
    }

    #[test]
    fn preview_is_capped() {
        let config = AllocationConfig::default();
        let a = sheet(&[(1, 1000.0, 5.0)]);
        let b = sheet(&[(2, 1000.0, 5.0)]);
        let rows: Vec<(i64, f64, f64)> = (100..108).map(|c| (c, 100.0, 1.0)).collect();
        let run = run_allocation(&config, a, b, sheet(&rows)).unwrap();
        assert_eq!(run.statements.len(), 8);
        assert_eq!(run.preview().len(), 5);
        assert_eq!(run.preview()[0].console, CellValue::Integer(100));
    }

    #[test]
    fn initial_reports_describe_uploaded_ledgers() {
        let config = AllocationConfig::default();
        let run = run_allocation(
            &config,
            sheet(&[(1, 1000.0, 5.0)]),
            sheet(&[(2, 266.0, 1.0)]),
            sheet(&[]),
        )
        .unwrap();
        assert_eq!(run.ledgers[0].initial.category, CargoCategory::Volumetric);
        assert_eq!(
            run.ledgers[0].describe(),
            "TRIWAY CFS Cargo Type: Volumetric Cargo (200.00 kg/CBM)"
        );
        assert_eq!(run.ledgers[1].initial.category, CargoCategory::Perfect);
    }

    #[test]
    fn missing_tracking_column_aborts_run() {
        let config = AllocationConfig::default();
        let tracking = Table::new(vec!["CONSOLE NO.".into(), "WEIGHT".into()]);
        let err = run_allocation(
            &config,
            sheet(&[(1, 1000.0, 5.0)]),
            sheet(&[(2, 1000.0, 5.0)]),
            tracking,
        )
        .unwrap_err();
        assert!(matches!(err, AllocError::MissingColumn { ref column, .. } if column == "CBM"));
    }

    #[test]
    fn zero_volume_ledger_aborts_run() {
        let config = AllocationConfig::default();
        let err = run_allocation(
            &config,
            sheet(&[(1, 1000.0, 0.0)]),
            sheet(&[(2, 1000.0, 5.0)]),
            sheet(&[]),
        )
        .unwrap_err();
        assert!(matches!(err, AllocError::DivisionByZero { .. }));
    }

    #[test]
    fn exports_use_fixed_file_names() {
        let config = AllocationConfig::default();
        let run = run_allocation(
            &config,
            sheet(&[(1, 1000.0, 5.0)]),
            sheet(&[(2, 1000.0, 5.0)]),
            sheet(&[(3, 100.0, 1.0)]),
        )
        .unwrap();
        let exports = run.exports().unwrap();
        let names: Vec<&str> = exports.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["updated_triway_cfs.xlsx", "updated_thirurani_cfs.xlsx"]
        );
        assert!(exports.iter().all(|e| !e.bytes.is_empty()));
    }
}
