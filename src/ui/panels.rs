use eframe::egui::{self, Color32, RichText, Ui};

use theatre_dash::catalog;
use theatre_dash::view::{DataSheet, Page};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – navigation
// ---------------------------------------------------------------------------

/// Render the left navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    // ---- Logo (centered) ----
    let logo = state.config.images_dir.join("navigation.png");
    ui.vertical_centered(|ui: &mut Ui| {
        if logo.exists() {
            ui.add(
                egui::Image::new(format!("file://{}", logo.display()))
                    .max_width(ui.available_width() * 0.8)
                    .max_height(120.0),
            );
        } else {
            ui.weak(format!("Error loading logo: {} not found", logo.display()));
        }
    });
    ui.add_space(4.0);

    ui.heading("Navigation");
    ui.separator();

    if ui.button("Home").clicked() {
        state.navigate(Page::Home);
    }
    if ui.button("Dashboard").clicked() {
        state.navigate(Page::Dashboard);
    }

    egui::CollapsingHeader::new("SQL Analysis")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.label("Choose an analysis to view");
            let mut selected = state.view.selected_analysis.clone();
            egui::ComboBox::from_id_salt("analysis_select")
                .selected_text(&selected)
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for analysis in catalog::ANALYSES {
                        ui.selectable_value(
                            &mut selected,
                            analysis.name.to_string(),
                            analysis.name,
                        );
                    }
                });
            state.view.select_analysis(&selected);
            if ui.button("Analyze").clicked() {
                state.navigate(Page::SqlAnalysis);
            }
        });

    egui::CollapsingHeader::new("Data")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.label("Data Sheets");
            for sheet in DataSheet::ALL {
                ui.radio_value(&mut state.view.data_sheet, sheet, sheet.label());
            }
            if ui.button("Show Data").clicked() {
                state.navigate(Page::Data);
            }
        });

    if ui.button("Contact").clicked() {
        state.navigate(Page::Contact);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Choose data folder…").clicked() {
                choose_data_dir(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("Data: {}", state.cache.data_dir().display()));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn choose_data_dir(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Choose the data folder")
        .set_directory(state.cache.data_dir())
        .pick_folder();

    if let Some(dir) = folder {
        if dir.is_dir() {
            state.set_data_dir(dir);
        } else {
            log::error!("Not a folder: {}", dir.display());
            state.status_message = Some(format!("Error: {} is not a folder", dir.display()));
        }
    }
}
