use super::classify::{classify_ratio, ratio, CargoCategory};
use crate::config::Thresholds;
use crate::data::model::{Record, Table};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Totals and density class of a set of records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub total_weight: f64,
    pub total_cbm: f64,
    pub ratio: f64,
    pub category: CargoCategory,
}

/// Sum weight and volume over `records` and classify the totals.
/// Fails when the volumes sum to zero.
pub fn aggregate(records: &[Record], thresholds: &Thresholds) -> Result<Aggregate> {
    let (total_weight, total_cbm) = sums(records);
    let r = ratio(total_weight, total_cbm, "aggregate")?;
    Ok(Aggregate {
        total_weight,
        total_cbm,
        ratio: r,
        category: classify_ratio(r, thresholds),
    })
}

pub(crate) fn sums(records: &[Record]) -> (f64, f64) {
    records
        .iter()
        .fold((0.0, 0.0), |(w, v), r| (w + r.weight, v + r.volume))
}

// ---------------------------------------------------------------------------
// Ledger – one CFS file
// ---------------------------------------------------------------------------

/// A CFS file: its sheet, the records read from it and running totals.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub label: String,
    table: Table,
    records: Vec<Record>,
    total_weight: f64,
    total_cbm: f64,
}

impl Ledger {
    /// Wrap an uploaded sheet. Requires the console/weight/CBM columns.
    pub fn from_table(label: &str, table: Table) -> Result<Self> {
        let records = table.records()?;
        let (total_weight, total_cbm) = sums(&records);
        Ok(Ledger {
            label: label.to_string(),
            table,
            records,
            total_weight,
            total_cbm,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn total_cbm(&self) -> f64 {
        self.total_cbm
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current ratio and category of the whole ledger.
    pub fn summary(&self, thresholds: &Thresholds) -> Result<Aggregate> {
        let r = ratio(
            self.total_weight,
            self.total_cbm,
            &format!("ledger '{}'", self.label),
        )?;
        Ok(Aggregate {
            total_weight: self.total_weight,
            total_cbm: self.total_cbm,
            ratio: r,
            category: classify_ratio(r, thresholds),
        })
    }

    /// Append rows of `source` for `records` (which must have been read from
    /// `source`) and fold them into the totals.
    pub(crate) fn append(&mut self, source: &Table, records: &[Record]) {
        let start = self.table.len();
        let rows: Vec<usize> = records.iter().map(|r| r.row).collect();
        self.table.append_rows_from(source, &rows);

        for (offset, record) in records.iter().enumerate() {
            self.total_weight += record.weight;
            self.total_cbm += record.volume;
            self.records.push(Record {
                row: start + offset,
                ..record.clone()
            });
        }
    }
}
