use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use cfs_allocator::data::export::XLSX_MIME;
use cfs_allocator::pipeline::ExportedLedger;

use crate::state::AppState;
use crate::ui::table;

const SHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods", "csv"];

// ---------------------------------------------------------------------------
// Left side panel – uploads and settings
// ---------------------------------------------------------------------------

/// Render the left input panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("CFS files");
    ui.separator();

    for slot in 0..2 {
        let label = state.config.ledgers[slot].label.clone();
        ui.strong(&label);
        if ui.button(format!("Upload {label}…")).clicked() {
            if let Some(path) = pick_sheet(&format!("Open {label} file")) {
                if let Err(e) = state.load_ledger(slot, &path) {
                    state.report(e);
                }
            }
        }
        if let Some(file) = &state.ledgers[slot] {
            ui.label(file.file_name());
        }
        if let Some(summary) = &state.summaries[slot] {
            ui.label(format!(
                "{label} Cargo Type: {} ({:.2} kg/CBM)",
                summary.category, summary.ratio
            ));
        }
        ui.add_space(6.0);
    }

    ui.separator();
    ui.strong("Cargo tracking sheet");
    if ui.button("Upload tracking sheet…").clicked() {
        if let Some(path) = pick_sheet("Open cargo tracking sheet") {
            if let Err(e) = state.load_tracking(&path) {
                state.report(e);
            }
        }
    }
    if let Some(file) = &state.tracking {
        ui.label(format!("{} ({} rows)", file.file_name(), file.table.len()));
    }

    ui.separator();
    ui.strong("Ratio ceiling");
    let before = state.config.max_ratio;
    ui.add(
        egui::DragValue::new(&mut state.config.max_ratio)
            .speed(1.0)
            .range(1.0..=5000.0)
            .suffix(" kg/CBM"),
    );
    if state.config.max_ratio != before {
        state.invalidate();
    }

    ui.add_space(8.0);
    if ui
        .add_enabled(state.can_allocate(), egui::Button::new("Allocate"))
        .clicked()
    {
        if let Err(e) = state.allocate() {
            state.report(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Central panel – statements, downloads and ledger preview
// ---------------------------------------------------------------------------

pub fn results_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(run) = &state.run else {
        ui.label("Upload both CFS files and the tracking sheet, then press Allocate.");
        return;
    };

    ui.heading("Cargo Allocation Statements:");
    if run.preview().is_empty() {
        ui.label("No console fits under the ratio ceiling.");
    }
    for statement in run.preview() {
        ui.label(statement.to_string());
    }
    if run.statements.len() > run.preview().len() {
        ui.label(
            RichText::new(format!(
                "… {} more",
                run.statements.len() - run.preview().len()
            ))
            .italics(),
        );
    }

    ui.separator();

    let mut failure = None;
    ui.horizontal(|ui: &mut Ui| {
        for (report, export) in run.ledgers.iter().zip(&state.exports) {
            if ui.button(format!("Download {}", report.slot.label)).clicked() {
                if let Err(e) = save_export(export) {
                    failure = Some(e);
                }
            }
        }
    });

    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, report) in run.ledgers.iter().enumerate() {
                ui.strong(format!(
                    "{} – {} rows, {:.2} kg / {:.3} CBM",
                    report.slot.label,
                    report.ledger.len(),
                    report.ledger.total_weight(),
                    report.ledger.total_cbm()
                ));
                ui.push_id(i, |ui: &mut Ui| {
                    table::sheet_table(ui, report.ledger.table());
                });
                ui.add_space(8.0);
            }
        });

    if let Some(e) = failure {
        state.report(e);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Load settings…").clicked() {
                ui.close_menu();
                let file = rfd::FileDialog::new()
                    .set_title("Load allocation settings")
                    .add_filter("JSON", &["json"])
                    .pick_file();
                if let Some(path) = file {
                    if let Err(e) = state.load_settings(&path) {
                        state.report(e);
                    }
                }
            }
        });

        ui.separator();
        ui.label(format!(
            "Ceiling {:.0} kg/CBM",
            state.config.max_ratio
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn pick_sheet(title: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Spreadsheets", SHEET_EXTENSIONS)
        .add_filter("Excel", &["xlsx", "xlsm", "xls"])
        .add_filter("CSV", &["csv"])
        .pick_file()
}

fn save_export(export: &ExportedLedger) -> Result<()> {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save updated CFS file")
        .set_file_name(&export.file_name)
        .add_filter("Excel", &["xlsx"])
        .save_file()
    else {
        return Ok(());
    };

    std::fs::write(&path, &export.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "Saved {} ({} bytes, {XLSX_MIME}) to {}",
        export.file_name,
        export.bytes.len(),
        path.display()
    );
    Ok(())
}
