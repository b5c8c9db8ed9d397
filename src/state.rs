use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use theatre_dash::config::{AppConfig, DataSource};
use theatre_dash::contact::{ContactError, ContactMessage, FormRelay};
use theatre_dash::data::cache::DataCache;
use theatre_dash::data::filter::FilterSelection;
use theatre_dash::data::loader::LoadError;
use theatre_dash::data::model::Table;
use theatre_dash::data::records::{SchemaError, TheatreData};
use theatre_dash::engine::{self, DashboardView, EngineError};
use theatre_dash::view::{DataSheet, Page, ViewState};

/// Why the dashboard data could not be prepared.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DataError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("The data does not have the expected layout: {0}")]
    Schema(#[from] SchemaError),
}

/// Contact form fields plus the outcome of the last submission.
#[derive(Debug, Default)]
pub struct ContactForm {
    pub message: ContactMessage,
    pub outcome: Option<Result<(), String>>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Memoized tables, keyed by (file, sheet).
    pub cache: DataCache,

    /// Page, filters and pickers.
    pub view: ViewState,

    /// Case + income records, once loaded (or the reason they could not be).
    data: Option<Result<Arc<TheatreData>, DataError>>,

    /// Aggregates for the selection they were computed from.
    dashboard: Option<(FilterSelection, Result<Arc<DashboardView>, EngineError>)>,

    pub contact: ContactForm,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let cache = DataCache::new(config.data_dir.clone());
        Self {
            config,
            cache,
            view: ViewState::default(),
            data: None,
            dashboard: None,
            contact: ContactForm::default(),
            status_message: None,
        }
    }

    /// Switch page. Failed loads are forgotten so the next visit retries them.
    pub fn navigate(&mut self, page: Page) {
        if matches!(self.data, Some(Err(_))) {
            self.data = None;
        }
        self.view.navigate(page);
    }

    /// Point the application at another data directory.
    pub fn set_data_dir(&mut self, dir: PathBuf) {
        log::info!("data directory changed to {}", dir.display());
        self.cache.set_data_dir(dir.clone());
        self.config.data_dir = dir;
        self.data = None;
        self.dashboard = None;
        self.view.filters = None;
        self.view.analysis_requested = false;
        self.status_message = None;
    }

    fn load_source(&self, source: &DataSource) -> Result<Arc<Table>, LoadError> {
        self.cache.load(&source.file, source.sheet())
    }

    /// Case and income records, loading them on first use.
    pub fn theatre_data(&mut self) -> Result<Arc<TheatreData>, DataError> {
        if let Some(result) = &self.data {
            return result.clone();
        }

        let result = self.read_theatre_data();
        match &result {
            Ok(data) => {
                log::info!(
                    "{} cases, {} income rows ready",
                    data.cases.len(),
                    data.income.len()
                );
                let filters = self
                    .view
                    .filters
                    .get_or_insert_with(|| FilterSelection::all(data));
                filters.restrict_to(data);
            }
            Err(e) => log::error!("Failed to prepare dashboard data: {e}"),
        }
        self.data = Some(result.clone());
        result
    }

    fn read_theatre_data(&self) -> Result<Arc<TheatreData>, DataError> {
        let raw = self.load_source(&self.config.raw_data)?;
        let income = self.load_source(&self.config.income)?;
        Ok(Arc::new(TheatreData::from_tables(&raw, &income)?))
    }

    /// Aggregates for the current filters, recomputed only when they change.
    /// `None` until the case and income records have loaded.
    pub fn dashboard_view(&mut self) -> Option<Result<Arc<DashboardView>, EngineError>> {
        let Some(Ok(data)) = self.data.clone() else {
            return None;
        };
        let selection = self
            .view
            .filters
            .get_or_insert_with(|| FilterSelection::all(&data))
            .clone();

        if let Some((computed_for, result)) = &self.dashboard {
            if *computed_for == selection {
                return Some(result.clone());
            }
        }

        log::debug!(
            "recomputing dashboard for {} case types, {} treatment functions",
            selection.case_types.len(),
            selection.treatment_functions.len()
        );
        let result = engine::compute(&data, &selection).map(Arc::new);
        self.dashboard = Some((selection, result.clone()));
        Some(result)
    }

    /// Reset the slicers to every observed value.
    pub fn clear_filters(&mut self) {
        if let Some(Ok(data)) = &self.data {
            self.view.filters = Some(FilterSelection::all(data));
        }
    }

    pub fn filters_mut(&mut self) -> Option<&mut FilterSelection> {
        self.view.filters.as_mut()
    }

    /// The sheet shown on the "Data" page.
    pub fn sheet_table(&self, sheet: DataSheet) -> Result<Arc<Table>, LoadError> {
        let source = match sheet {
            DataSheet::RawData => &self.config.raw_data,
            DataSheet::OphthalmologyIncome => &self.config.income,
        };
        self.load_source(source)
    }

    /// CSV behind the selected analysis.
    pub fn analysis_table(&self) -> Result<Arc<Table>, LoadError> {
        self.cache.load(&self.view.analysis_csv(), None)
    }

    /// Post the contact form once and remember the outcome.
    pub fn send_contact(&mut self) {
        let outcome = FormRelay::new(
            &self.config.contact_endpoint,
            Duration::from_secs(self.config.contact_timeout_secs),
        )
        .and_then(|relay| relay.send(&self.contact.message));

        self.contact.outcome = Some(match outcome {
            Ok(()) => {
                self.contact.message = ContactMessage::default();
                Ok(())
            }
            Err(ContactError::MissingField(field)) => {
                Err(format!("Please fill in the {field} field."))
            }
            Err(e) => {
                log::error!("contact form failed: {e}");
                Err("An error occurred while sending your message.".to_string())
            }
        });
    }
}
