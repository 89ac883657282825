use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::TableCache;
use crate::data::filter::FilterSelection;
use crate::data::model::BattingTable;
use crate::error::DataLoadError;
use crate::stats::recompute::{DerivedState, recompute};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// File the current table came from (or failed to come from).
    pub data_path: PathBuf,

    /// Loaded table (None until a load succeeds).
    pub table: Option<Arc<BattingTable>>,

    /// Sidebar selections.
    pub selection: FilterSelection,

    /// Aggregates for `selection`, rebuilt whenever it changes.
    pub derived: Option<DerivedState>,

    /// Team → colour, for the scatter plot.
    pub team_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            data_path: config.data_path.clone(),
            config,
            table: None,
            selection: FilterSelection::default(),
            derived: None,
            team_colors: None,
            status_message: None,
        }
    }

    /// Load `path` through `cache`; `force` bypasses a cached copy.
    pub fn load(&mut self, cache: &TableCache, path: &Path, force: bool) {
        self.data_path = path.to_path_buf();
        let result = if force {
            cache.reload(path)
        } else {
            cache.get_or_load(path)
        };
        match result {
            Ok(table) => self.set_table(table),
            Err(e) => self.fail(e),
        }
    }

    /// Ingest a newly loaded table, reset filters and recompute.
    pub fn set_table(&mut self, table: Arc<BattingTable>) {
        self.team_colors = Some(ColorMap::new(&table.teams));
        self.table = Some(table);
        self.selection = FilterSelection::default();
        self.status_message = None;
        self.refilter();
    }

    fn fail(&mut self, err: DataLoadError) {
        log::error!("Failed to load data: {err}");
        self.table = None;
        self.derived = None;
        self.team_colors = None;
        self.status_message = Some(format!("Error: {err}"));
    }

    /// Replace the selection and recompute if it changed.
    pub fn set_selection(&mut self, selection: FilterSelection) {
        if selection != self.selection {
            self.selection = selection;
            self.refilter();
        }
    }

    /// Recompute every aggregate for the current selection.
    pub fn refilter(&mut self) {
        self.derived = self
            .table
            .as_ref()
            .map(|table| recompute(table, &self.selection, &self.config));
    }
}
