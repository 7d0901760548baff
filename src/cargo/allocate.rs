use std::collections::HashMap;
use std::fmt;

use super::classify::ratio;
use super::ledger::{sums, Ledger};
use crate::data::filter::UsedConsoles;
use crate::data::model::{CellValue, Record, Table};
use crate::error::Result;

/// "Console X should go to Y", in assignment order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationStatement {
    pub console: CellValue,
    pub ledger: String,
}

impl fmt::Display for AllocationStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Console {} should go to {}", self.console, self.ledger)
    }
}

/// All candidate rows of one console.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub console: CellValue,
    pub records: Vec<Record>,
    pub weight: f64,
    pub volume: f64,
}

/// Group `records` by console, groups ordered by the first row each console
/// appears on. Rows inside a group keep their order.
pub fn group_records(records: &[Record]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<&CellValue, usize> = HashMap::new();

    for record in records {
        let slot = *index.entry(&record.console).or_insert_with(|| {
            groups.push(Group {
                console: record.console.clone(),
                records: Vec::new(),
                weight: 0.0,
                volume: 0.0,
            });
            groups.len() - 1
        });
        groups[slot].records.push(record.clone());
    }

    for group in &mut groups {
        let (w, v) = sums(&group.records);
        group.weight = w;
        group.volume = v;
    }
    groups
}

/// Greedily move candidate consoles into `ledger` while its ratio stays at
/// or under `max_ratio`.
///
/// `pool` holds candidate records read from `source`. Consoles are tried once
/// each, in first-seen order; a console that would push the ratio over the
/// ceiling is skipped for this call. Accepted consoles are added to `used`
/// so a later call for another ledger will not take them again.
///
/// The ledger is only modified when the whole pass succeeds.
pub fn allocate(
    ledger: &mut Ledger,
    source: &Table,
    pool: &[Record],
    max_ratio: f64,
    used: &mut UsedConsoles,
) -> Result<Vec<AllocationStatement>> {
    let mut total_weight = ledger.total_weight();
    let mut total_cbm = ledger.total_cbm();
    let mut accepted: Vec<Group> = Vec::new();

    for group in group_records(pool) {
        if used.contains(&group.console) {
            continue;
        }

        let new_weight = total_weight + group.weight;
        let new_cbm = total_cbm + group.volume;
        let new_ratio = ratio(
            new_weight,
            new_cbm,
            &format!("ledger '{}' with console {}", ledger.label, group.console),
        )?;

        if new_ratio <= max_ratio {
            log::debug!(
                "console {} -> {} (ratio {new_ratio:.2})",
                group.console,
                ledger.label
            );
            total_weight = new_weight;
            total_cbm = new_cbm;
            accepted.push(group);
        } else {
            log::debug!(
                "console {} skipped for {}: ratio {new_ratio:.2} > {max_ratio}",
                group.console,
                ledger.label
            );
        }
    }

    let mut statements = Vec::with_capacity(accepted.len());
    for group in accepted {
        ledger.append(source, &group.records);
        used.insert(group.console.clone());
        statements.push(AllocationStatement {
            console: group.console,
            ledger: ledger.label.clone(),
        });
    }

    log::info!(
        "{}: {} console(s) allocated, {} records total",
        ledger.label,
        statements.len(),
        ledger.len()
    );
    Ok(statements)
}
