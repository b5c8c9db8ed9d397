use eframe::egui;

use theatre_dash::config::AppConfig;
use theatre_dash::view::Page;

use crate::state::AppState;
use crate::ui::{dashboard, pages, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TheatreDashApp {
    pub state: AppState,
}

impl TheatreDashApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for TheatreDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("navigation_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.view.page {
                    Page::Home => pages::home_page(ui, &self.state),
                    Page::Dashboard => dashboard::dashboard_page(ui, &mut self.state),
                    Page::SqlAnalysis => pages::sql_analysis_page(ui, &mut self.state),
                    Page::Data => pages::data_page(ui, &mut self.state),
                    Page::Contact => pages::contact_page(ui, &mut self.state),
                });
        });
    }
}
