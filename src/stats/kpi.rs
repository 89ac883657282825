use crate::data::filter::FilteredView;

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kpis {
    pub records: usize,
    pub total_runs: i64,
    /// Mean strike rate rounded to 2 decimals; `None` when no row has one.
    pub avg_strike_rate: Option<f64>,
    pub total_fours: i64,
    pub total_sixes: i64,
}

pub fn compute_kpis(view: &FilteredView<'_>) -> Kpis {
    let mut total_runs: i64 = 0;
    let mut total_fours: i64 = 0;
    let mut total_sixes: i64 = 0;
    let mut sr_sum = 0.0;
    let mut sr_count = 0usize;

    for rec in view.iter() {
        // Sums saturate instead of overflowing.
        total_runs = total_runs.saturating_add(rec.total_runs.unwrap_or(0));
        total_fours = total_fours.saturating_add(rec.fours.unwrap_or(0));
        total_sixes = total_sixes.saturating_add(rec.sixes.unwrap_or(0));
        if let Some(sr) = rec.strike_rate {
            sr_sum += sr;
            sr_count += 1;
        }
    }

    let avg_strike_rate = (sr_count > 0).then(|| round2(sr_sum / sr_count as f64));

    Kpis {
        records: view.len(),
        total_runs,
        avg_strike_rate,
        total_fours,
        total_sixes,
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
