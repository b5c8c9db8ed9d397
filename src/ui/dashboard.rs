use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, Ui};

use theatre_dash::chart;
use theatre_dash::engine::{CountRow, DashboardView, GroupStat};
use theatre_dash::format;

use crate::state::AppState;
use crate::ui::{plot, table};

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Dashboard page
// ---------------------------------------------------------------------------

pub fn dashboard_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Theatre Utilisation Efficiency Dashboard");
    ui.add_space(4.0);

    let data = match state.theatre_data() {
        Ok(data) => data,
        Err(e) => {
            error_label(ui, &e.to_string());
            return;
        }
    };

    let case_types = data.case_types();
    let treatment_functions = data.treatment_functions();

    ui.horizontal_top(|ui: &mut Ui| {
        slicer(ui, state, "Filter by Case Type:", &case_types, Slicer::CaseType);
        ui.add_space(24.0);
        slicer(
            ui,
            state,
            "Filter by Treatment Function:",
            &treatment_functions,
            Slicer::TreatmentFunction,
        );
    });
    ui.separator();

    match state.dashboard_view() {
        Some(Ok(view)) => render_view(ui, &view),
        Some(Err(e)) => error_label(ui, &e.to_string()),
        None => {}
    }

    ui.add_space(8.0);
    if ui.button("Clear Filters").clicked() {
        state.clear_filters();
    }
}

pub fn error_label(ui: &mut Ui, message: &str) {
    ui.label(RichText::new(message).color(Color32::RED));
}

// ---------------------------------------------------------------------------
// Slicers
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Slicer {
    CaseType,
    TreatmentFunction,
}

fn slicer(
    ui: &mut Ui,
    state: &mut AppState,
    title: &str,
    values: &BTreeSet<String>,
    which: Slicer,
) {
    let Some(filters) = state.filters_mut() else {
        return;
    };
    let selected = match which {
        Slicer::CaseType => &mut filters.case_types,
        Slicer::TreatmentFunction => &mut filters.treatment_functions,
    };

    ui.vertical(|ui: &mut Ui| {
        let header_text = format!("{title}  ({}/{})", selected.len(), values.len());
        egui::CollapsingHeader::new(RichText::new(header_text).strong())
            .id_salt(title)
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        *selected = values.clone();
                    }
                    if ui.small_button("None").clicked() {
                        selected.clear();
                    }
                });
                egui::ScrollArea::vertical()
                    .max_height(160.0)
                    .show(ui, |ui: &mut Ui| {
                        for value in values {
                            let mut checked = selected.contains(value);
                            let label = if value.is_empty() { "(blank)" } else { value.as_str() };
                            if ui.checkbox(&mut checked, label).changed() {
                                if checked {
                                    selected.insert(value.clone());
                                } else {
                                    selected.remove(value);
                                }
                            }
                        }
                    });
            });
    });
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

fn render_view(ui: &mut Ui, view: &DashboardView) {
    metrics(ui, view);
    ui.separator();

    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Case Distribution by Treatment Function and Case Type");
        case_pivot(&mut cols[0], view);
        cols[0].add_space(8.0);
        cols[0].strong("Top 10 Longest Average Procedure Times (Elective)");
        duration_table(&mut cols[0], "longest_elective", "ProcedureName", &view.longest_elective);

        cols[1].strong("Number of Cases by Procedure");
        count_table(
            &mut cols[1],
            "cases_by_procedure",
            "ProcedureName",
            "CaseCount",
            &view.cases_by_procedure,
            240.0,
        );
        cols[1].add_space(8.0);
        cols[1].strong("Top 10 Shortest Average Procedure Times (Elective)");
        duration_table(&mut cols[1], "shortest_elective", "ProcedureName", &view.shortest_elective);
    });
    ui.separator();

    ui.columns(2, |cols: &mut [Ui]| {
        plot::bar_chart(
            &mut cols[0],
            &chart::efficient_ophthalmology_consultants(&view.efficient_ophthalmology_consultants),
            CHART_HEIGHT,
        );
        plot::bar_chart(
            &mut cols[1],
            &chart::best_consultants(&view.best_consultants),
            CHART_HEIGHT,
        );
    });
    ui.separator();

    ui.columns(3, |cols: &mut [Ui]| {
        plot::bar_chart(
            &mut cols[0],
            &chart::consultant_efficiency(&view.consultant_efficiency),
            CHART_HEIGHT,
        );
        cols[0].add_space(8.0);
        cols[0].strong("Top 10 Procedures with Highest Average Duration");
        duration_table(
            &mut cols[0],
            "longest_procedures",
            "ProcedureName",
            &view.longest_procedures,
        );

        cols[1].strong("Consultant Performance Analysis");
        let rows: Vec<Vec<String>> = view
            .consultant_performance
            .iter()
            .map(|s| vec![s.key.clone(), format::mean(s.mean), format::count(s.count)])
            .collect();
        table::scrolling_grid(
            &mut cols[1],
            "consultant_performance",
            &["Consultant", "mean", "count"],
            &rows,
            240.0,
        );
        cols[1].add_space(8.0);
        plot::bar_chart(
            &mut cols[1],
            &chart::procedure_count(&view.procedure_counts),
            CHART_HEIGHT,
        );

        cols[2].strong("Top 20 Income by Procedure");
        let rows: Vec<Vec<String>> = view
            .top_income
            .iter()
            .map(|r| vec![r.procedure.clone(), format::pounds_short(r.income)])
            .collect();
        table::scrolling_grid(
            &mut cols[2],
            "top_income",
            &["Procedure_Name", "Income"],
            &rows,
            240.0,
        );
        cols[2].add_space(8.0);
        plot::bar_chart(
            &mut cols[2],
            &chart::fastest_procedures(&view.fastest_procedures),
            CHART_HEIGHT,
        );
    });
    ui.separator();

    ui.columns(3, |cols: &mut [Ui]| {
        plot::bar_chart(
            &mut cols[0],
            &chart::late_start_consultants(&view.late_start_consultants),
            CHART_HEIGHT,
        );

        cols[1].strong("Ophthalmology Theatres with the Most Late Starts");
        count_table(
            &mut cols[1],
            "late_start_theatres",
            "TheatreName",
            "LateStarts",
            &view.late_start_theatres,
            160.0,
        );

        cols[2].strong("Ophthalmology Theatres with the Most Early Finishes");
        count_table(
            &mut cols[2],
            "early_finish_theatres",
            "TheatreName",
            "EarlyFinishes",
            &view.early_finish_theatres,
            160.0,
        );
    });
}

fn metrics(ui: &mut Ui, view: &DashboardView) {
    let s = &view.summary;
    let tiles = [
        ("Total Cases", format::count(s.total_cases)),
        ("Total Surgery Minutes", format::minutes(s.total_surgery_minutes)),
        ("Total Procedures Income", format::pounds(s.total_income)),
        ("Top 10 Procedures Income", format::pounds(s.top10_income)),
    ];
    ui.columns(tiles.len(), |cols: &mut [Ui]| {
        for (col, (title, value)) in cols.iter_mut().zip(tiles) {
            col.group(|ui: &mut Ui| {
                ui.label(title);
                ui.heading(value);
            });
        }
    });
}

fn case_pivot(ui: &mut Ui, view: &DashboardView) {
    let pivot = &view.case_pivot;
    let mut headers = vec!["TreatmentFunction"];
    headers.extend(pivot.case_types.iter().map(String::as_str));
    let rows: Vec<Vec<String>> = pivot
        .treatment_functions
        .iter()
        .zip(&pivot.counts)
        .map(|(tf, counts)| {
            std::iter::once(tf.clone())
                .chain(counts.iter().map(|c| format::count(*c)))
                .collect()
        })
        .collect();
    table::scrolling_grid(ui, "case_pivot", &headers, &rows, 240.0);
}

fn duration_table(ui: &mut Ui, id: &str, key_title: &str, stats: &[GroupStat]) {
    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|s| vec![s.key.clone(), format::mean(s.mean)])
        .collect();
    table::grid(ui, id, &[key_title, "DurationOfSurgeryMinutes"], &rows);
}

fn count_table(
    ui: &mut Ui,
    id: &str,
    key_title: &str,
    count_title: &str,
    rows: &[CountRow],
    max_height: f32,
) {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| vec![r.key.clone(), format::count(r.count)])
        .collect();
    table::scrolling_grid(ui, id, &[key_title, count_title], &rows, max_height);
}
