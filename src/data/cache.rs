use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use super::loader::load_file;
use super::model::BattingTable;
use crate::error::DataLoadError;

static GLOBAL: OnceLock<TableCache> = OnceLock::new();

/// Loaded table kept for the lifetime of the process.
///
/// The lock is held across the read, so concurrent first loads of the same
/// path hit the disk once.
#[derive(Debug, Default)]
pub struct TableCache {
    entry: Mutex<Option<(PathBuf, Arc<BattingTable>)>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by the dashboard.
    pub fn global() -> &'static TableCache {
        GLOBAL.get_or_init(TableCache::new)
    }

    /// Return the cached table for `path`, reading the file on first use.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<BattingTable>, DataLoadError> {
        let mut entry = self.lock();
        if let Some((cached_path, table)) = entry.as_ref() {
            if cached_path == path {
                log::debug!("Table cache hit for {}", path.display());
                return Ok(Arc::clone(table));
            }
        }
        Self::fill(&mut entry, path)
    }

    /// Re-read `path` even if it is cached.
    pub fn reload(&self, path: &Path) -> Result<Arc<BattingTable>, DataLoadError> {
        let mut entry = self.lock();
        Self::fill(&mut entry, path)
    }

    /// Drop the cached table; the next call reads from disk.
    pub fn invalidate(&self) {
        self.lock().take();
    }

    fn fill(
        entry: &mut MutexGuard<'_, Option<(PathBuf, Arc<BattingTable>)>>,
        path: &Path,
    ) -> Result<Arc<BattingTable>, DataLoadError> {
        let table = Arc::new(load_file(path)?);
        **entry = Some((path.to_path_buf(), Arc::clone(&table)));
        Ok(table)
    }

    fn lock(&self) -> MutexGuard<'_, Option<(PathBuf, Arc<BattingTable>)>> {
        // A panic while loading leaves the previous entry intact.
        self.entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
