use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use theatre_dash::data::model::Table;

/// Scrollable, virtualised view of a loaded sheet.
pub fn data_table(ui: &mut Ui, id: &str, table: &Table) {
    ui.label(format!("{} rows × {} columns", table.len(), table.columns.len()));
    if table.columns.is_empty() {
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .columns(Column::auto().at_least(60.0), table.columns.len())
                .header(20.0, |mut header| {
                    for name in &table.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, table.len(), |mut row| {
                        let cells = &table.rows[row.index()];
                        for cell in cells {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell.to_string());
                            });
                        }
                    });
                });
        });
    });
}

/// Small fixed table: a header row plus pre-formatted cells.
pub fn grid(ui: &mut Ui, id: &str, headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        ui.label("No rows for the current filters.");
        return;
    }
    egui::Grid::new(id)
        .striped(true)
        .num_columns(headers.len())
        .show(ui, |ui: &mut Ui| {
            for h in headers {
                ui.label(RichText::new(*h).strong());
            }
            ui.end_row();
            for row in rows {
                for cell in row {
                    ui.label(cell);
                }
                ui.end_row();
            }
        });
}

/// `grid` inside a height-limited scroll area.
pub fn scrolling_grid(
    ui: &mut Ui,
    id: &str,
    headers: &[&str],
    rows: &[Vec<String>],
    max_height: f32,
) {
    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::vertical()
            .max_height(max_height)
            .show(ui, |ui: &mut Ui| grid(ui, id, headers, rows));
    });
}
