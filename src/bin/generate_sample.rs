use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Row {
    season: i32,
    batsman: String,
    batting_team: String,
    total_runs: i64,
    strike_rate: f64,
    fours: i64,
    sixes: i64,
    balls_faced: i64,
}

/// SplitMix64: small, seedable and good enough for synthetic rows.
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Normal sample via Box-Muller.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let radius = (-2.0 * (1.0 - self.unit()).ln()).sqrt();
        let angle = std::f64::consts::TAU * self.unit();
        mean + std_dev * radius * angle.cos()
    }
}

/// (name, team, mean balls per season, strike rate, share of boundaries hit for six)
const PLAYERS: [(&str, &str, f64, f64, f64); 12] = [
    ("V Kohli", "Royal Challengers Bangalore", 380.0, 130.0, 0.30),
    ("AB de Villiers", "Royal Challengers Bangalore", 280.0, 152.0, 0.45),
    ("MS Dhoni", "Chennai Super Kings", 250.0, 136.0, 0.50),
    ("SK Raina", "Chennai Super Kings", 330.0, 137.0, 0.35),
    ("RG Sharma", "Mumbai Indians", 350.0, 130.0, 0.38),
    ("KA Pollard", "Mumbai Indians", 200.0, 148.0, 0.60),
    ("DA Warner", "Sunrisers Hyderabad", 400.0, 140.0, 0.30),
    ("S Dhawan", "Delhi Capitals", 380.0, 125.0, 0.20),
    ("CH Gayle", "Punjab Kings", 300.0, 148.0, 0.62),
    ("KL Rahul", "Punjab Kings", 390.0, 135.0, 0.33),
    ("AM Rahane", "Rajasthan Royals", 330.0, 121.0, 0.18),
    ("G Gambhir", "Kolkata Knight Riders", 340.0, 123.0, 0.12),
];

fn generate(rng: &mut SplitMix64) -> Vec<Row> {
    let mut rows = Vec::new();
    for season in 2015..=2022 {
        for &(name, team, balls_mean, sr_mean, six_share) in &PLAYERS {
            // Some players skip a season.
            if rng.unit() < 0.08 {
                continue;
            }
            let balls = rng.normal(balls_mean, balls_mean * 0.25).round().max(6.0) as i64;
            let strike_rate = rng.normal(sr_mean, 12.0).max(60.0);
            let runs = (balls as f64 * strike_rate / 100.0).round() as i64;
            let boundary_runs = runs as f64 * rng.normal(0.55, 0.05).clamp(0.3, 0.8);
            let sixes = (boundary_runs * six_share / 6.0).round() as i64;
            let fours = ((boundary_runs - sixes as f64 * 6.0) / 4.0).round().max(0.0) as i64;

            rows.push(Row {
                season,
                batsman: name.to_string(),
                batting_team: team.to_string(),
                total_runs: runs,
                strike_rate: (runs as f64 / balls as f64 * 10000.0).round() / 100.0,
                fours,
                sixes,
                balls_faced: balls,
            });
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("season", DataType::Int32, false),
        Field::new("batsman", DataType::Utf8, false),
        Field::new("batting_team", DataType::Utf8, false),
        Field::new("total_runs", DataType::Int64, false),
        Field::new("strike_rate", DataType::Float64, false),
        Field::new("fours", DataType::Int64, false),
        Field::new("sixes", DataType::Int64, false),
        Field::new("balls_faced", DataType::Int64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.season))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.batsman.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.batting_team.as_str()))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.total_runs))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.strike_rate))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.fours))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.sixes))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.balls_faced))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ipl_batting_summary.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SplitMix64(2008);
    let rows = generate(&mut rng);

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => write_csv(path, &rows)?,
        Some("parquet") | Some("pq") => write_parquet(path, &rows)?,
        other => bail!("Unsupported output extension: {other:?} (use .csv or .parquet)"),
    }

    log::info!("Wrote {} batting records to {}", rows.len(), path.display());
    println!("Wrote {} batting records to {output}", rows.len());
    Ok(())
}
