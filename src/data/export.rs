//! XLSX export of a ledger table.
//!
//! One sheet, header row first, one row per record, no index column.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use super::model::{CellValue, Table};
use crate::error::Result;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Serialize `table` into a fresh in-memory workbook.
pub fn table_to_xlsx(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let formats = CellFormats::new();

    {
        let sheet = workbook.add_worksheet();
        write_headers(sheet, &table.columns, &formats.header)?;

        for (i, row) in table.rows.iter().enumerate() {
            let excel_row = (i + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                write_cell(sheet, excel_row, col as u16, value, &formats)?;
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    log::debug!(
        "Exported {} rows x {} columns ({} bytes)",
        table.len(),
        table.columns.len(),
        bytes.len()
    );
    Ok(bytes)
}

struct CellFormats {
    header: Format,
    date: Format,
    date_time: Format,
}

impl CellFormats {
    fn new() -> Self {
        CellFormats {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format("yyyy-mm-dd"),
            date_time: Format::new().set_num_format("yyyy-mm-dd hh:mm"),
        }
    }
}

fn write_headers(sheet: &mut Worksheet, headers: &[String], format: &Format) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, format)?;
    }
    Ok(())
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    formats: &CellFormats,
) -> std::result::Result<(), XlsxError> {
    match value {
        CellValue::String(s) => {
            sheet.write_string(row, col, s)?;
        }
        // Dates stay serial numbers; the number format marks them as dates.
        CellValue::Date(serial) if serial.is_finite() => {
            let format = if serial.fract() == 0.0 {
                &formats.date
            } else {
                &formats.date_time
            };
            sheet.write_number_with_format(row, col, *serial, format)?;
        }
        CellValue::Integer(i) => {
            sheet.write_number(row, col, *i as f64)?;
        }
        // Non-finite numbers have no xlsx representation; leave the cell blank.
        CellValue::Float(v) if v.is_finite() => {
            sheet.write_number(row, col, *v)?;
        }
        CellValue::Float(_) | CellValue::Date(_) | CellValue::Null => {}
        CellValue::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}
