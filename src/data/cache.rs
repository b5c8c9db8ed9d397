use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::loader::{load_table, LoadError};
use super::model::Table;

/// Cache key: resolved file path plus optional sheet name.
type CacheKey = (PathBuf, Option<String>);

/// Process-wide memo of loaded tables, keyed by (file, sheet).
///
/// Only successful loads are stored; a failed key is retried on the next call.
/// Entries are never invalidated. The lock is held across a load, so two
/// callers asking for the same uncached key trigger a single read.
#[derive(Debug)]
pub struct DataCache {
    data_dir: PathBuf,
    entries: Mutex<HashMap<CacheKey, Arc<Table>>>,
}

impl DataCache {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        DataCache {
            data_dir: data_dir.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Point the cache at another directory. Existing entries stay valid
    /// because they are keyed by resolved path.
    pub fn set_data_dir(&mut self, data_dir: impl Into<PathBuf>) {
        self.data_dir = data_dir.into();
    }

    /// Load `filename` (relative to the data directory) or return the memoized table.
    pub fn load(&self, filename: &str, sheet: Option<&str>) -> Result<Arc<Table>, LoadError> {
        let path = self.data_dir.join(filename);
        let key = (path, sheet.map(str::to_string));

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = entries.get(&key) {
            log::debug!("cache hit: {filename} {sheet:?}");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load_table(&key.0, sheet)?);
        log::info!(
            "Loaded {filename} {sheet:?}: {} rows, {} columns",
            table.len(),
            table.columns.len()
        );
        entries.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Number of memoized tables.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
