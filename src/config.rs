//! Application configuration.
//!
//! Resolution order:
//! 1. Built-in defaults (the NHS workbook under `data/`)
//! 2. JSON file named by `THEATRE_DASH_CONFIG`, else `theatre-dash.json`
//!    in the working directory when present
//! 3. Environment overrides `THEATRE_DASH_DATA_DIR`, `THEATRE_DASH_CONTACT_URL`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "THEATRE_DASH_CONFIG";
pub const DATA_DIR_ENV: &str = "THEATRE_DASH_DATA_DIR";
pub const CONTACT_URL_ENV: &str = "THEATRE_DASH_CONTACT_URL";
pub const DEFAULT_CONFIG_FILE: &str = "theatre-dash.json";

pub const WORKBOOK: &str = "NHS_Trust_Theatre_Utilisation_Efficiency_Dashboard.xlsx";
pub const RAW_SHEET: &str = "Raw Data";
pub const INCOME_SHEET: &str = "Ophthalmology Income";

/// One table to load: a file under the data directory plus an optional sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSource {
    pub file: String,
    #[serde(default)]
    pub sheet: Option<String>,
}

impl DataSource {
    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory holding the workbook and the per-analysis CSVs.
    pub data_dir: PathBuf,
    /// Directory holding `navigation.png` / `Homebanner1.png`.
    pub images_dir: PathBuf,
    pub raw_data: DataSource,
    pub income: DataSource,
    pub contact_endpoint: String,
    pub contact_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("data"),
            images_dir: PathBuf::from("Images"),
            raw_data: DataSource {
                file: WORKBOOK.to_string(),
                sheet: Some(RAW_SHEET.to_string()),
            },
            income: DataSource {
                file: WORKBOOK.to_string(),
                sheet: Some(INCOME_SHEET.to_string()),
            },
            contact_endpoint: "https://formspree.io/f/xqkrogby".to_string(),
            contact_timeout_secs: 15,
        }
    }
}

impl AppConfig {
    /// Defaults, then the config file, then environment overrides.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("using config {}", path.display());
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(CONTACT_URL_ENV).filter(|v| !v.is_empty()) {
            self.contact_endpoint = url;
        }
    }
}
