use std::collections::BTreeMap;

use crate::data::filter::FilteredView;
use crate::data::model::BattingTable;

/// The `k` batsmen with the most sixes in the view, largest first.
///
/// Groups are visited in name order and stable-sorted ascending by total
/// before taking the last `k`, so among equal totals the name that sorts
/// later ranks higher and survives the cut.
pub fn top_six_hitters(view: &FilteredView<'_>, k: usize) -> Vec<(String, i64)> {
    let mut by_batsman: BTreeMap<&str, i64> = BTreeMap::new();
    for rec in view.iter() {
        *by_batsman.entry(rec.batsman.as_str()).or_default() += rec.sixes.unwrap_or(0);
    }

    let mut totals: Vec<(&str, i64)> = by_batsman.into_iter().collect();
    totals.sort_by_key(|&(_, sixes)| sixes);

    let skip = totals.len().saturating_sub(k);
    totals[skip..]
        .iter()
        .rev()
        .map(|&(name, sixes)| (name.to_string(), sixes))
        .collect()
}

/// Runs per season for one batsman over the whole table, ascending by season.
///
/// Season and team filters do not apply here.
pub fn season_wise_runs(table: &BattingTable, batsman: &str) -> Vec<(i32, i64)> {
    let mut by_season: BTreeMap<i32, i64> = BTreeMap::new();
    for rec in table.records.iter().filter(|r| r.batsman == batsman) {
        *by_season.entry(rec.season).or_default() += rec.total_runs.unwrap_or(0);
    }
    by_season.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::rec;

    fn table() -> BattingTable {
        BattingTable::from_records(vec![
            rec(2020, "A", "X", 50, 125.0, 4, 2, 40),
            rec(2021, "A", "X", 30, 100.0, 2, 1, 30),
            rec(2020, "B", "Y", 70, 140.0, 6, 5, 50),
            rec(2020, "C", "Y", 20, 90.0, 1, 3, 22),
            rec(2021, "D", "Z", 12, 80.0, 1, 3, 15),
        ])
    }

    #[test]
    fn top_hitters_are_descending() {
        let t = table();
        let top = top_six_hitters(&FilteredView::all(&t), 2);
        assert_eq!(top, vec![("B".to_string(), 5), ("D".to_string(), 3)]);
    }

    #[test]
    fn ties_favour_later_names() {
        let t = table();
        let top = top_six_hitters(&FilteredView::all(&t), 4);
        let names: Vec<_> = top.iter().map(|(n, _)| n.as_str()).collect();
        // A=3, C=3, D=3 tie behind B=5.
        assert_eq!(names, vec!["B", "D", "C", "A"]);
    }

    #[test]
    fn length_is_capped_by_distinct_batsmen() {
        let t = table();
        let view = FilteredView::all(&t);
        for k in 0..8 {
            let top = top_six_hitters(&view, k);
            assert_eq!(top.len(), k.min(t.batsmen.len()));

            let listed: i64 = top.iter().map(|(_, s)| s).sum();
            let all: i64 = t.records.iter().filter_map(|r| r.sixes).sum();
            assert!(listed <= all);
        }
    }

    #[test]
    fn season_runs_ignore_other_players() {
        let t = table();
        assert_eq!(season_wise_runs(&t, "A"), vec![(2020, 50), (2021, 30)]);
        assert!(season_wise_runs(&t, "nobody").is_empty());
    }

    #[test]
    fn season_runs_sum_duplicate_seasons() {
        let t = BattingTable::from_records(vec![
            rec(2021, "A", "X", 30, 100.0, 2, 1, 30),
            rec(2020, "A", "X", 50, 125.0, 4, 2, 40),
            rec(2020, "A", "Y", 5, 50.0, 0, 0, 10),
        ]);
        assert_eq!(season_wise_runs(&t, "A"), vec![(2020, 55), (2021, 30)]);
    }
}
