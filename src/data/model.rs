use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::UnknownColumn;

/// Columns every source file must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "season",
    "batsman",
    "batting_team",
    "total_runs",
    "strike_rate",
    "fours",
    "sixes",
    "balls_faced",
];

// ---------------------------------------------------------------------------
// Record – one row of the batting summary
// ---------------------------------------------------------------------------

/// One batsman's aggregated performance as stored in the source table.
///
/// Numeric stat cells may be blank in the source; those are kept as `None`
/// and skipped by every aggregate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    pub season: i32,
    pub batsman: String,
    pub batting_team: String,
    #[serde(deserialize_with = "lenient_count")]
    pub total_runs: Option<i64>,
    #[serde(deserialize_with = "finite_float")]
    pub strike_rate: Option<f64>,
    #[serde(deserialize_with = "lenient_count")]
    pub fours: Option<i64>,
    #[serde(deserialize_with = "lenient_count")]
    pub sixes: Option<i64>,
    #[serde(deserialize_with = "lenient_count")]
    pub balls_faced: Option<i64>,
}

impl Record {
    /// Value of a numeric column as `f64`, `None` when missing.
    pub fn value(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::Season => Some(self.season as f64),
            NumericColumn::TotalRuns => self.total_runs.map(|v| v as f64),
            NumericColumn::StrikeRate => self.strike_rate,
            NumericColumn::Fours => self.fours.map(|v| v as f64),
            NumericColumn::Sixes => self.sixes.map(|v| v as f64),
            NumericColumn::BallsFaced => self.balls_faced.map(|v| v as f64),
        }
    }
}

// -- Cell parsing --

/// Counts written by dataframe tools as `50.0` once a column held a NaN.
#[derive(Deserialize)]
#[serde(untagged)]
enum CountCell {
    Int(i64),
    Float(f64),
    Text(String),
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let cell: Option<CountCell> = Option::deserialize(deserializer)?;
    match cell {
        None => Ok(None),
        Some(CountCell::Int(i)) => Ok(Some(i)),
        Some(CountCell::Float(f)) if f.is_nan() => Ok(None),
        Some(CountCell::Float(f)) if f.fract() == 0.0 && f.is_finite() => Ok(Some(f as i64)),
        Some(CountCell::Float(f)) => Err(D::Error::custom(format!("{f} is not a whole number"))),
        Some(CountCell::Text(s)) => parse_count_text(&s).map_err(D::Error::custom),
    }
}

fn parse_count_text(s: &str) -> Result<Option<i64>, String> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Ok(Some(i));
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(Some(f as i64)),
        _ => Err(format!("'{s}' is not a whole number")),
    }
}

fn finite_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FloatCell {
        Num(f64),
        Text(String),
    }

    use serde::de::Error;

    let cell: Option<FloatCell> = Option::deserialize(deserializer)?;
    match cell {
        None => Ok(None),
        Some(FloatCell::Num(f)) => Ok(Some(f).filter(|v| v.is_finite())),
        Some(FloatCell::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .map(|f| Some(f).filter(|v| v.is_finite()))
                .map_err(|_| D::Error::custom(format!("'{s}' is not a number")))
        }
    }
}

// ---------------------------------------------------------------------------
// NumericColumn – typed handle for the columns the statistics read
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumericColumn {
    Season,
    TotalRuns,
    StrikeRate,
    Fours,
    Sixes,
    BallsFaced,
}

impl NumericColumn {
    /// Columns shown in the correlation heatmap, in display order.
    pub const HEATMAP: [NumericColumn; 5] = [
        NumericColumn::TotalRuns,
        NumericColumn::BallsFaced,
        NumericColumn::StrikeRate,
        NumericColumn::Fours,
        NumericColumn::Sixes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Season => "season",
            NumericColumn::TotalRuns => "total_runs",
            NumericColumn::StrikeRate => "strike_rate",
            NumericColumn::Fours => "fours",
            NumericColumn::Sixes => "sixes",
            NumericColumn::BallsFaced => "balls_faced",
        }
    }

    /// Human-readable axis label.
    pub fn label(self) -> &'static str {
        match self {
            NumericColumn::Season => "Season",
            NumericColumn::TotalRuns => "Total Runs",
            NumericColumn::StrikeRate => "Strike Rate",
            NumericColumn::Fours => "Fours",
            NumericColumn::Sixes => "Sixes",
            NumericColumn::BallsFaced => "Balls Faced",
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericColumn {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "season" => Ok(NumericColumn::Season),
            "total_runs" => Ok(NumericColumn::TotalRuns),
            "strike_rate" => Ok(NumericColumn::StrikeRate),
            "fours" => Ok(NumericColumn::Fours),
            "sixes" => Ok(NumericColumn::Sixes),
            "balls_faced" => Ok(NumericColumn::BallsFaced),
            other => Err(UnknownColumn(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// BattingTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed table with the distinct values offered as filter options.
#[derive(Debug, Clone, PartialEq)]
pub struct BattingTable {
    /// All rows, in source order.
    pub records: Vec<Record>,
    pub seasons: BTreeSet<i32>,
    pub batsmen: BTreeSet<String>,
    pub teams: BTreeSet<String>,
}

impl BattingTable {
    /// Build the filter option sets from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut seasons = BTreeSet::new();
        let mut batsmen = BTreeSet::new();
        let mut teams = BTreeSet::new();

        for rec in &records {
            seasons.insert(rec.season);
            batsmen.insert(rec.batsman.clone());
            teams.insert(rec.batting_team.clone());
        }

        BattingTable {
            records,
            seasons,
            batsmen,
            teams,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Shorthand used by the statistics tests.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn rec(
        season: i32,
        batsman: &str,
        team: &str,
        runs: i64,
        strike_rate: f64,
        fours: i64,
        sixes: i64,
        balls: i64,
    ) -> Record {
        Record {
            season,
            batsman: batsman.to_string(),
            batting_team: team.to_string(),
            total_runs: Some(runs),
            strike_rate: Some(strike_rate),
            fours: Some(fours),
            sixes: Some(sixes),
            balls_faced: Some(balls),
        }
    }

    #[test]
    fn from_records_collects_sorted_options() {
        let table = BattingTable::from_records(vec![
            rec(2021, "B", "Y", 10, 90.0, 1, 0, 11),
            rec(2020, "A", "X", 50, 125.0, 4, 2, 40),
            rec(2020, "B", "X", 5, 50.0, 0, 0, 10),
        ]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.seasons.iter().copied().collect::<Vec<_>>(), vec![2020, 2021]);
        assert_eq!(table.batsmen.iter().cloned().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(table.teams.iter().cloned().collect::<Vec<_>>(), vec!["X", "Y"]);
    }

    #[test]
    fn column_names_round_trip_through_from_str() {
        for col in NumericColumn::HEATMAP {
            assert_eq!(col.name().parse::<NumericColumn>(), Ok(col));
        }
        assert_eq!(
            "wickets".parse::<NumericColumn>(),
            Err(UnknownColumn("wickets".to_string()))
        );
    }

    #[test]
    fn count_text_accepts_integral_floats() {
        assert_eq!(parse_count_text("50"), Ok(Some(50)));
        assert_eq!(parse_count_text("50.0"), Ok(Some(50)));
        assert_eq!(parse_count_text(""), Ok(None));
        assert_eq!(parse_count_text("NaN"), Ok(None));
        assert!(parse_count_text("4.5").is_err());
    }
}
