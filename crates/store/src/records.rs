//! File-backed record store.
//!
//! Brands live in `<data_dir>/brands.json`, the timeline in
//! `<data_dir>/timeline.json`. Both are JSON arrays and are re-read on every
//! call, so edits to the files show up without a restart. Nothing here ever
//! writes to them.
//!
//! Read and parse failures are logged and degrade to an empty collection.

use laozihao_core::brand::{Brand, TimelineEntry};
use laozihao_core::error::StoreError;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

pub const BRANDS_FILE: &str = "brands.json";
pub const TIMELINE_FILE: &str = "timeline.json";

/// Read-only access to the brand and timeline collections.
#[derive(Debug, Clone)]
pub struct RecordStore {
    data_dir: PathBuf,
}

impl RecordStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// All brands, or an empty list if the file is missing or malformed.
    pub fn list_brands(&self) -> Vec<Brand> {
        self.load_brands().unwrap_or_else(|e| {
            error!(error = %e, "Failed to load brand data");
            Vec::new()
        })
    }

    /// Brands whose name, category, description or any keyword contains
    /// `query`, ignoring case. An empty query returns every brand.
    pub fn search_brands(&self, query: &str) -> Vec<Brand> {
        let brands = self.list_brands();
        if query.is_empty() {
            return brands;
        }

        let needle = query.to_lowercase();
        brands.into_iter().filter(|b| b.matches(&needle)).collect()
    }

    /// The brand with exactly this id.
    pub fn get_brand(&self, id: i64) -> Option<Brand> {
        self.list_brands().into_iter().find(|b| b.id == id)
    }

    /// All timeline entries, or an empty list on failure.
    pub fn list_timeline(&self) -> Vec<TimelineEntry> {
        self.load_timeline().unwrap_or_else(|e| {
            error!(error = %e, "Failed to load timeline data");
            Vec::new()
        })
    }

    /// Strict variant of [`list_brands`](Self::list_brands), for diagnostics.
    pub fn load_brands(&self) -> Result<Vec<Brand>, StoreError> {
        read_collection(&self.data_dir.join(BRANDS_FILE))
    }

    /// Strict variant of [`list_timeline`](Self::list_timeline).
    pub fn load_timeline(&self) -> Result<Vec<TimelineEntry>, StoreError> {
        read_collection(&self.data_dir.join(TIMELINE_FILE))
    }
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| StoreError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let items: Vec<T> = serde_json::from_str(&content).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!(path = %path.display(), count = items.len(), "Loaded collection");
    Ok(items)
}
