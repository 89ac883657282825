use std::collections::BTreeMap;

use super::correlation::{CorrelationMatrix, CorrelationTest, correlation, correlation_matrix};
use super::distribution::{
    Bin, BinRule, BoxSummary, ViolinSummary, box_summary, distribution_inputs, histogram, kde,
    scatter_by_team, violin_summary,
};
use super::grouped::{season_wise_runs, top_six_hitters};
use super::kpi::{Kpis, compute_kpis};
use crate::config::DashboardConfig;
use crate::data::filter::{FilterSelection, FilteredView, apply_filters};
use crate::data::model::{BattingTable, NumericColumn};
use crate::error::InsufficientDataError;

/// Columns compared by the significance test.
pub const CORRELATION_PAIR: (NumericColumn, NumericColumn) =
    (NumericColumn::TotalRuns, NumericColumn::BallsFaced);

/// Scatter axes (x, y).
pub const SCATTER_AXES: (NumericColumn, NumericColumn) =
    (NumericColumn::BallsFaced, NumericColumn::TotalRuns);

/// Everything the charts need for one filter selection.
#[derive(Debug, Clone)]
pub struct DerivedState {
    /// Indices of the rows in the filtered view.
    pub visible_indices: Vec<usize>,
    pub kpis: Kpis,
    pub top_sixers: Vec<(String, i64)>,
    /// Only when a single batsman is selected.
    pub season_runs: Option<(String, Vec<(i32, i64)>)>,
    pub strike_rate_density: Vec<(f64, f64)>,
    pub strike_rate_histogram: Vec<Bin>,
    pub strike_rate_violin: Option<ViolinSummary>,
    pub runs_box: Option<BoxSummary>,
    pub runs_histogram: Vec<Bin>,
    pub runs_density: Vec<(f64, f64)>,
    pub scatter: BTreeMap<String, Vec<[f64; 2]>>,
    pub heatmap: CorrelationMatrix,
    pub correlation: Result<CorrelationTest, InsufficientDataError>,
}

impl DerivedState {
    pub fn view<'a>(&self, table: &'a BattingTable) -> FilteredView<'a> {
        FilteredView::from_indices(table, self.visible_indices.clone())
    }
}

/// Filter `table` by `selection` and compute every aggregate from scratch.
pub fn recompute(
    table: &BattingTable,
    selection: &FilterSelection,
    config: &DashboardConfig,
) -> DerivedState {
    let view = apply_filters(table, selection);
    if view.is_empty() {
        log::debug!("Selection {selection:?} matches no records");
    }

    let strike_rates = distribution_inputs(&view, NumericColumn::StrikeRate);
    let runs = distribution_inputs(&view, NumericColumn::TotalRuns);

    let season_runs = selection
        .batsman
        .as_only()
        .map(|name| (name.clone(), season_wise_runs(table, name)));

    let (cx, cy) = CORRELATION_PAIR;
    let correlation = correlation(&view, cx, cy);
    if let Err(e) = &correlation {
        log::warn!("Correlation test skipped: {e}");
    }

    let (sx, sy) = SCATTER_AXES;
    DerivedState {
        kpis: compute_kpis(&view),
        top_sixers: top_six_hitters(&view, config.top_k),
        season_runs,
        strike_rate_density: kde(&strike_rates, config.density_points),
        strike_rate_histogram: histogram(&strike_rates, BinRule::Fixed(config.strike_rate_bins)),
        strike_rate_violin: violin_summary(&strike_rates, config.density_points),
        runs_box: box_summary(&runs),
        runs_histogram: histogram(&runs, BinRule::Auto),
        runs_density: kde(&runs, config.density_points),
        scatter: scatter_by_team(&view, sx, sy),
        heatmap: correlation_matrix(&view, &NumericColumn::HEATMAP),
        correlation,
        visible_indices: view.indices().to_vec(),
    }
}
