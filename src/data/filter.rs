use std::collections::BTreeSet;

use super::model::{CellValue, Record};

/// Console numbers already sitting in some ledger.
pub type UsedConsoles = BTreeSet<CellValue>;

/// Union of the console keys present in any of `ledgers`.
pub fn used_consoles<'a, I>(ledgers: I) -> UsedConsoles
where
    I: IntoIterator<Item = &'a [Record]>,
{
    ledgers
        .into_iter()
        .flat_map(|records| records.iter().map(|r| r.console.clone()))
        .collect()
}

/// Drop candidate rows whose console is already used.
///
/// Relative order of the surviving rows is preserved; the input is not
/// touched.
pub fn filter_unassigned(candidates: &[Record], used: &UsedConsoles) -> Vec<Record> {
    candidates
        .iter()
        .filter(|r| !used.contains(&r.console))
        .cloned()
        .collect()
}
