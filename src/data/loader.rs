use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Xlsx};

use super::model::{CellValue, Table};
use crate::error::{AllocError, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a sheet from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, first row is the header
/// * `.csv` – header row with column names
pub fn load_table_from_path(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => load_workbook(path)?,
        "csv" => {
            let file = std::fs::File::open(path)?;
            load_csv_reader(file)?
        }
        other => {
            return Err(AllocError::MalformedFile(format!(
                "unsupported file extension: .{other}"
            )))
        }
    };

    log::debug!(
        "Loaded {} rows, columns {:?} from {}",
        table.len(),
        table.columns,
        path.display()
    );
    Ok(table)
}

/// Parse an in-memory `.xlsx` upload.
pub fn load_xlsx_bytes(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| AllocError::MalformedFile(e.to_string()))?;
    let range = first_sheet(&mut workbook)?;
    Ok(table_from_range(&range))
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path) -> Result<Table> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| AllocError::MalformedFile(e.to_string()))?;
    let range = first_sheet(&mut workbook)?;
    Ok(table_from_range(&range))
}

fn first_sheet<RS, R>(workbook: &mut R) -> Result<Range<Data>>
where
    RS: Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AllocError::MalformedFile("workbook has no worksheet".to_string()))?;
    workbook
        .worksheet_range(&sheet)
        .map_err(|e| AllocError::MalformedFile(format!("sheet '{sheet}': {e}")))
}

/// First row becomes the header; blank header cells are named
/// `Unnamed: <index>`. Rows with no value at all are dropped.
fn table_from_range(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Table::default();
    };

    let columns: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell_value(cell) {
            CellValue::Null => format!("Unnamed: {i}"),
            other => other.to_string(),
        })
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        let values: Vec<CellValue> = row.iter().map(cell_value).collect();
        if values.iter().all(CellValue::is_null) {
            continue;
        }
        table.push_row(values);
    }
    table
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Float(v) => CellValue::from_float(*v),
        Data::Int(v) => CellValue::Integer(*v),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Date(dt.as_f64()),
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, cell types guessed per value.
pub fn load_csv_reader<R: Read>(input: R) -> Result<Table> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AllocError::MalformedFile(format!("reading CSV headers: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = Table::new(headers);

    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| AllocError::MalformedFile(format!("CSV row {row_no}: {e}")))?;
        let values: Vec<CellValue> = record.iter().map(guess_cell_type).collect();
        if values.iter().all(CellValue::is_null) {
            continue;
        }
        table.push_row(values);
    }

    Ok(table)
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::from_float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}
