use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Optional settings file read from the working directory at startup.
pub const CONFIG_FILE: &str = "dashboard.json";

/// Dashboard settings. Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Batting summary loaded at startup.
    pub data_path: PathBuf,
    /// Bars in the six-hitters chart.
    pub top_k: usize,
    /// Bins in the strike-rate bell curve.
    pub strike_rate_bins: usize,
    /// Samples per density curve.
    pub density_points: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("ipl_batting_summary.csv"),
            top_k: 10,
            strike_rate_bins: 30,
            density_points: 100,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Read `path` if it exists; fall back to defaults on any problem.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No {} found, using default settings", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded settings from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "top_k": 5, "data_path": "data/ipl.parquet" }"#).unwrap();

        let config = DashboardConfig::load_or_default(&path);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.data_path, PathBuf::from("data/ipl.parquet"));
        assert_eq!(config.strike_rate_bins, 30);
        assert_eq!(config.density_points, 100);
    }

    #[test]
    fn malformed_or_absent_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(DashboardConfig::from_file(&path).is_err());
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
    }
}
