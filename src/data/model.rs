use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{AllocError, Result};

/// Grouping key column.
pub const CONSOLE_COLUMN: &str = "CONSOLE NO.";
/// Weight column, kg.
pub const WEIGHT_COLUMN: &str = "WEIGHT";
/// Volume column, CBM.
pub const CBM_COLUMN: &str = "CBM";

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// One cell of an uploaded sheet.
///
/// The console column keys groups and the used-console set, so cells are
/// totally ordered and hashable. Variants order by kind first, then by
/// payload; floats and dates compare with `total_cmp`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// Excel serial date (days since 1899-12-30, fraction is time of day).
    Date(f64),
    String(String),
}

impl CellValue {
    fn kind(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Integer(_) => 2,
            CellValue::Float(_) => 3,
            CellValue::Date(_) => 4,
            CellValue::String(_) => 5,
        }
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) | (Date(a), Date(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Bool(a), Bool(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(v) | CellValue::Date(v) => v.to_bits().hash(state),
            CellValue::String(s) => s.hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(serial) => write_serial_date(f, *serial),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Spreadsheets store every number as a float. Whole numbers come back
    /// as `Integer` so that console 1001 read from xlsx equals console 1001
    /// read from CSV.
    pub fn from_float(v: f64) -> Self {
        const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
        if v.is_finite() && v.fract() == 0.0 && v.abs() < EXACT_LIMIT {
            CellValue::Integer(v as i64)
        } else {
            CellValue::Float(v)
        }
    }

    /// Numeric value of a number cell. Dates are not measures.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// `yyyy-mm-dd`, plus ` HH:MM` when the serial carries a time of day.
/// Serials before 1900-03-01 are off by one day, as in Excel itself.
fn write_serial_date(f: &mut fmt::Formatter<'_>, serial: f64) -> fmt::Result {
    if !serial.is_finite() {
        return write!(f, "{serial}");
    }
    let day = serial.floor();
    // 25569 is 1970-01-01.
    let (y, m, d) = civil_from_days(day as i64 - 25_569);
    write!(f, "{y:04}-{m:02}-{d:02}")?;
    let minutes = ((serial - day) * 1440.0).round() as i64;
    if minutes > 0 {
        write!(f, " {:02}:{:02}", minutes / 60 % 24, minutes % 60)?;
    }
    Ok(())
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y, m, d)
}

// ---------------------------------------------------------------------------
// Record – the three columns the allocator cares about
// ---------------------------------------------------------------------------

/// One shipment row reduced to its grouping key and measures.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Index of the row in the table it was read from.
    pub row: usize,
    pub console: CellValue,
    /// kg
    pub weight: f64,
    /// CBM
    pub volume: f64,
}

// ---------------------------------------------------------------------------
// Table – a parsed sheet
// ---------------------------------------------------------------------------

/// A parsed sheet: ordered header plus rows, each row as wide as the header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Null);
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact (case- and whitespace-sensitive) header lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| AllocError::MissingColumn {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }

    /// Read `CONSOLE NO.`, `WEIGHT` and `CBM` from every row.
    ///
    /// Blank measures count as zero; anything else that is not a finite number is
    /// an error.
    pub fn records(&self) -> Result<Vec<Record>> {
        let console_idx = self.require_column(CONSOLE_COLUMN)?;
        let weight_idx = self.require_column(WEIGHT_COLUMN)?;
        let cbm_idx = self.require_column(CBM_COLUMN)?;

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let at = |idx: usize| row.get(idx).unwrap_or(&CellValue::Null);
                Ok(Record {
                    row: i,
                    console: at(console_idx).clone(),
                    weight: measure(at(weight_idx), i, WEIGHT_COLUMN)?,
                    volume: measure(at(cbm_idx), i, CBM_COLUMN)?,
                })
            })
            .collect()
    }

    /// Append rows of `source` (by index) aligning cells by column name.
    /// Columns only `source` has are added to this table's header; cells
    /// with no counterpart become `Null`.
    pub fn append_rows_from(&mut self, source: &Table, rows: &[usize]) {
        let mut mapping = Vec::with_capacity(source.columns.len());
        for name in &source.columns {
            let idx = match self.column_index(name) {
                Some(idx) => idx,
                None => {
                    self.columns.push(name.clone());
                    for existing in &mut self.rows {
                        existing.push(CellValue::Null);
                    }
                    self.columns.len() - 1
                }
            };
            mapping.push(idx);
        }

        for &r in rows {
            let Some(src_row) = source.rows.get(r) else {
                continue;
            };
            let mut row = vec![CellValue::Null; self.columns.len()];
            for (src_col, value) in src_row.iter().enumerate() {
                if let Some(&dst_col) = mapping.get(src_col) {
                    row[dst_col] = value.clone();
                }
            }
            self.rows.push(row);
        }
    }
}

/// Blank cells count as zero. Anything else must be a finite number;
/// row numbers in errors are 1-based sheet rows (row 1 is the header).
fn measure(value: &CellValue, row: usize, column: &str) -> Result<f64> {
    let parsed = match value {
        CellValue::Null => return Ok(0.0),
        CellValue::String(s) if s.trim().is_empty() => return Ok(0.0),
        CellValue::String(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(AllocError::InvalidNumber {
            row: row + 2,
            column: column.to_string(),
            value: value.to_string(),
        }),
    }
}
