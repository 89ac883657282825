/// Statistics over a filtered view.
///
/// ```text
///   FilteredView
///        │
///        ├── kpi           sums and mean strike rate
///        ├── grouped       top six hitters, season-wise runs
///        ├── distribution  raw values, histogram, density, box/violin, scatter
///        └── correlation   Pearson r, approximate p-value, heatmap
///        │
///        ▼
///   recompute → DerivedState (one pass per selection change)
/// ```

pub mod correlation;
pub mod distribution;
pub mod grouped;
pub mod kpi;
pub mod recompute;
