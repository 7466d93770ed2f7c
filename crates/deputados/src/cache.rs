//! Scrape cache: which legislatures have already been processed in full and
//! which deputy IDs have been seen. Lets repeated `--full` runs skip closed
//! legislatures instead of re-walking the whole archive.

use crate::types::Legislature;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cache serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ScrapeCache {
    pub legislatures: BTreeSet<Legislature>,
    pub ids: BTreeSet<u32>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ScrapeCache {
    pub fn default_path() -> PathBuf {
        Path::new("cache").join("deputados_cache.json")
    }

    /// Load the cache, or start empty when the file is absent or unreadable.
    /// A corrupt cache only costs a re-scrape, so it is never fatal.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(cache) => cache,
                Err(e) => {
                    log::warn!("Could not parse cache file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No cache file at {}, starting empty", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not open cache file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn store(&mut self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        self.updated_at = Some(Utc::now());
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn contains(&self, legislature: Legislature) -> bool {
        self.legislatures.contains(&legislature)
    }

    /// Mark a legislature as fully processed and remember its deputy IDs.
    /// Returns how many of the IDs were not seen before.
    pub fn record(
        &mut self,
        legislature: Legislature,
        ids: impl IntoIterator<Item = u32>,
    ) -> usize {
        self.legislatures.insert(legislature);
        ids.into_iter().filter(|&id| self.ids.insert(id)).count()
    }
}
