use eframe::egui::{self, Color32, RichText, Ui};

use theatre_dash::catalog;

use crate::state::AppState;
use crate::ui::dashboard::error_label;
use crate::ui::table;

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

const HOME_SECTIONS: &[(&str, &str)] = &[
    (
        "Overview",
        "The Theatre Utilisation Dashboard gives an at-a-glance view of how operating theatres are \
         used: case mix, procedure durations, consultant performance and schedule deviations.",
    ),
    (
        "Data",
        "Figures come from publicly available NHS theatre data, pre-processed into a workbook with \
         a \"Raw Data\" sheet of theatre cases and an \"Ophthalmology Income\" sheet of tariff \
         income per procedure.",
    ),
    (
        "Features",
        "• Dashboard: filter by case type and treatment function to recompute every metric, table \
         and chart.\n\
         • SQL Analysis: the reference queries behind each pre-aggregated dataset, with the \
         resulting table.\n\
         • Data: browse the source sheets.",
    ),
    (
        "Usage",
        "Use the navigation panel on the left to move between pages. File → Choose data folder… \
         switches to another copy of the data.",
    ),
    (
        "Note",
        "This is an independent project using publicly available NHS data. It is not developed \
         by, nor affiliated with, the NHS or any related government body.",
    ),
];

pub fn home_page(ui: &mut Ui, state: &AppState) {
    ui.heading("Theatre Utilisation Dashboard");

    let banner = state.config.images_dir.join("Homebanner1.png");
    if banner.exists() {
        ui.add(
            egui::Image::new(format!("file://{}", banner.display()))
                .max_width(ui.available_width())
                .max_height(260.0),
        );
    }

    for (title, body) in HOME_SECTIONS {
        ui.add_space(8.0);
        ui.label(RichText::new(*title).strong().size(16.0));
        ui.label(*body);
    }
}

// ---------------------------------------------------------------------------
// SQL Analysis
// ---------------------------------------------------------------------------

pub fn sql_analysis_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Detailed SQL Analysis");

    let name = state.view.selected_analysis.clone();
    if name.is_empty() {
        ui.label(
            "Please select an analysis from the navigation panel and click 'Run Analysis' \
             to view results.",
        );
        return;
    }

    ui.strong(&name);
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label(RichText::new("Description:").strong());
        ui.label(catalog::description(&name));
    });

    let mut sql = catalog::sql(&name);
    ui.add(
        egui::TextEdit::multiline(&mut sql)
            .code_editor()
            .desired_width(f32::INFINITY),
    );

    if ui.button("Run Analysis").clicked() {
        state.view.analysis_requested = true;
    }

    if state.view.analysis_requested {
        match state.analysis_table() {
            Ok(t) => table::data_table(ui, "analysis_table", &t),
            Err(e) => {
                log::warn!("analysis {name}: {e}");
                error_label(ui, "Failed to load data for the selected analysis.");
                ui.weak(e.to_string());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

pub fn data_page(ui: &mut Ui, state: &mut AppState) {
    let sheet = state.view.data_sheet;
    ui.heading(sheet.label());

    match state.sheet_table(sheet) {
        Ok(t) => table::data_table(ui, "sheet_table", &t),
        Err(e) => {
            error_label(ui, "Failed to load the selected dataset.");
            ui.weak(e.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

pub fn contact_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Contact Me");

    ui.group(|ui: &mut Ui| {
        egui::Grid::new("contact_form")
            .num_columns(2)
            .show(ui, |ui: &mut Ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut state.contact.message.name);
                ui.end_row();

                ui.label("Email");
                ui.text_edit_singleline(&mut state.contact.message.email);
                ui.end_row();

                ui.label("Message");
                ui.text_edit_multiline(&mut state.contact.message.message);
                ui.end_row();
            });

        if ui.button("Send Message").clicked() {
            state.send_contact();
        }
    });

    match &state.contact.outcome {
        Some(Ok(())) => {
            ui.label(
                RichText::new("Thank you for your message! I will get back to you soon.")
                    .color(Color32::DARK_GREEN),
            );
        }
        Some(Err(msg)) => error_label(ui, msg),
        None => {}
    }
}
