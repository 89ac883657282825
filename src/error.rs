use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Load failures (fatal for the dashboard)
// ---------------------------------------------------------------------------

/// Reasons a batting table could not be produced from a file.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}: {source:#}", path.display())]
    Parse {
        path: PathBuf,
        source: anyhow::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

// ---------------------------------------------------------------------------
// Statistics that cannot be computed for the current view (recoverable)
// ---------------------------------------------------------------------------

/// The correlation test is undefined for the current filtered view.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InsufficientDataError {
    #[error("not enough data: {n} paired observations (need at least 3)")]
    TooFewObservations { n: usize },

    #[error("not enough data: '{column}' is constant across the view")]
    ZeroVariance { column: String },
}

/// A column name that is not one of the numeric batting columns.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("unknown numeric column '{0}'")]
pub struct UnknownColumn(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_message_names_the_column() {
        let err = DataLoadError::MissingColumn {
            path: PathBuf::from("ipl.csv"),
            column: "sixes".to_string(),
        };
        assert_eq!(err.to_string(), "ipl.csv is missing required column 'sixes'");
    }

    #[test]
    fn insufficient_data_reports_sample_size() {
        let err = InsufficientDataError::TooFewObservations { n: 2 };
        assert!(err.to_string().contains("2 paired observations"));
    }
}
