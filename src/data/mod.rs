/// Batting data: the record model, file loading, the process-wide table
/// cache and the sidebar filters.
///
/// A file is parsed by `loader` into a `BattingTable` (`model`), shared
/// through `cache`, and narrowed per selection by `filter` into a
/// `FilteredView` that the statistics read.

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
