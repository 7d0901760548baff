use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use cfs_allocator::data::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Read-only grid of a ledger sheet
// ---------------------------------------------------------------------------

pub fn sheet_table(ui: &mut Ui, sheet: &Table) {
    if sheet.columns.is_empty() {
        ui.label("(empty sheet)");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(240.0)
        .columns(Column::auto().at_least(70.0), sheet.columns.len())
        .header(20.0, |mut header| {
            for name in &sheet.columns {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, sheet.len(), |mut row| {
                let cells = &sheet.rows[row.index()];
                for cell in cells {
                    row.col(|ui| {
                        ui.label(cell_text(cell));
                    });
                }
            });
        });
}

fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        other => other.to_string(),
    }
}
