use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::config::{INCOME_SHEET, RAW_SHEET};
use crate::data::filter::FilterSelection;

/// Top-level pages reachable from the navigation panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    #[default]
    Home,
    Dashboard,
    SqlAnalysis,
    Data,
    Contact,
}

/// Which sheet the "Data" page shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSheet {
    #[default]
    RawData,
    OphthalmologyIncome,
}

impl DataSheet {
    pub const ALL: [DataSheet; 2] = [DataSheet::RawData, DataSheet::OphthalmologyIncome];

    pub fn label(self) -> &'static str {
        match self {
            DataSheet::RawData => RAW_SHEET,
            DataSheet::OphthalmologyIncome => INCOME_SHEET,
        }
    }
}

/// Everything the user has chosen, independent of rendering.
///
/// `filters` is `None` until the dashboard data has been loaded once;
/// it then starts with every value selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub page: Page,
    pub filters: Option<FilterSelection>,
    pub selected_analysis: String,
    /// Set by "Run Analysis"; cleared when another analysis is picked.
    pub analysis_requested: bool,
    pub data_sheet: DataSheet,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            page: Page::Home,
            filters: None,
            selected_analysis: catalog::ANALYSES[0].name.to_string(),
            analysis_requested: false,
            data_sheet: DataSheet::RawData,
        }
    }
}

impl ViewState {
    pub fn navigate(&mut self, page: Page) {
        if self.page != page {
            log::debug!("navigate {:?} -> {page:?}", self.page);
        }
        self.page = page;
    }

    pub fn select_analysis(&mut self, name: &str) {
        if self.selected_analysis != name {
            self.selected_analysis = name.to_string();
            self.analysis_requested = false;
        }
    }

    /// CSV behind the selected analysis.
    pub fn analysis_csv(&self) -> String {
        catalog::csv_filename(&self.selected_analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_home_with_first_analysis() {
        let v = ViewState::default();
        assert_eq!(v.page, Page::Home);
        assert_eq!(v.selected_analysis, "Cases_by_Treatment_and_Case_Type");
        assert_eq!(v.analysis_csv(), "Cases_by_Treatment_and_Case_Type.csv");
        assert!(v.filters.is_none());
    }

    #[test]
    fn picking_another_analysis_clears_the_request() {
        let mut v = ViewState::default();
        v.analysis_requested = true;
        v.select_analysis("Cases_by_Treatment_and_Case_Type");
        assert!(v.analysis_requested);
        v.select_analysis("Theatre_Most_Early_Finishes");
        assert!(!v.analysis_requested);
    }

    #[test]
    fn serializes_to_json() {
        let mut v = ViewState::default();
        v.navigate(Page::Dashboard);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["page"], "Dashboard");
        assert_eq!(json["data_sheet"], "RawData");
    }
}
