use std::fmt;

use super::model::{BattingTable, Record};

// ---------------------------------------------------------------------------
// Filter predicate: one optional equality constraint per filter column
// ---------------------------------------------------------------------------

/// A single dropdown choice: either no constraint or one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    /// Whether `value` passes this constraint.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }

    pub fn as_only(&self) -> Option<&T> {
        match self {
            Choice::All => None,
            Choice::Only(v) => Some(v),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str("All"),
            Choice::Only(v) => write!(f, "{v}"),
        }
    }
}

/// Sidebar selections. Comparisons are exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSelection {
    pub season: Choice<i32>,
    pub batsman: Choice<String>,
    pub batting_team: Choice<String>,
}

impl FilterSelection {
    /// Whether a record satisfies every non-`All` constraint.
    pub fn matches(&self, rec: &Record) -> bool {
        self.season.admits(&rec.season)
            && self.batsman.admits(&rec.batsman)
            && self.batting_team.admits(&rec.batting_team)
    }
}

/// Return indices of records that pass all active filters, in table order.
pub fn filtered_indices(table: &BattingTable, selection: &FilterSelection) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView – the rows of a table that survived a selection
// ---------------------------------------------------------------------------

/// A borrowed subset of a [`BattingTable`], preserving source order.
///
/// An empty view is valid; aggregates over it report zero sums and no means.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a BattingTable,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// View over every row of `table`.
    pub fn all(table: &'a BattingTable) -> Self {
        Self {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    /// Rebuild a view from indices cached by the caller.
    pub fn from_indices(table: &'a BattingTable, indices: Vec<usize>) -> Self {
        debug_assert!(indices.iter().all(|&i| i < table.len()));
        Self { table, indices }
    }

    /// Narrow this view further. Applying the same selection twice is a no-op.
    pub fn apply(&self, selection: &FilterSelection) -> FilteredView<'a> {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| selection.matches(&self.table.records[i]))
            .collect();
        FilteredView {
            table: self.table,
            indices,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = &self.table.records;
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl PartialEq for FilteredView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.table, other.table) && self.indices == other.indices
    }
}

/// Filter the whole table by `selection`.
pub fn apply_filters<'a>(table: &'a BattingTable, selection: &FilterSelection) -> FilteredView<'a> {
    FilteredView::from_indices(table, filtered_indices(table, selection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::rec;

    fn table() -> BattingTable {
        BattingTable::from_records(vec![
            rec(2020, "A", "X", 50, 125.0, 4, 2, 40),
            rec(2021, "A", "X", 30, 100.0, 2, 1, 30),
            rec(2020, "B", "Y", 70, 140.0, 6, 4, 50),
            rec(2021, "b", "Y", 5, 50.0, 0, 0, 10),
        ])
    }

    #[test]
    fn default_selection_keeps_everything() {
        let t = table();
        let view = apply_filters(&t, &FilterSelection::default());
        assert_eq!(view.indices(), &[0, 1, 2, 3]);
        assert_eq!(view, FilteredView::all(&t));
    }

    #[test]
    fn constraints_combine_and_keep_order() {
        let t = table();
        let selection = FilterSelection {
            season: Choice::Only(2020),
            batting_team: Choice::Only("Y".to_string()),
            ..Default::default()
        };
        let view = apply_filters(&t, &selection);
        assert_eq!(view.indices(), &[2]);

        let by_player = FilterSelection {
            batsman: Choice::Only("A".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&t, &by_player).indices(), &[0, 1]);
    }

    #[test]
    fn batsman_match_is_case_sensitive() {
        let t = table();
        let selection = FilterSelection {
            batsman: Choice::Only("B".to_string()),
            ..Default::default()
        };
        let names: Vec<_> = apply_filters(&t, &selection).iter().map(|r| r.batsman.clone()).collect();
        assert_eq!(names, vec!["B"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let t = table();
        let selections = [
            FilterSelection::default(),
            FilterSelection {
                season: Choice::Only(2021),
                ..Default::default()
            },
            FilterSelection {
                season: Choice::Only(1999),
                batsman: Choice::Only("A".to_string()),
                batting_team: Choice::Only("X".to_string()),
            },
        ];
        for selection in &selections {
            let once = apply_filters(&t, selection);
            let twice = once.apply(selection);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn unmatched_season_gives_empty_view() {
        let t = table();
        let selection = FilterSelection {
            season: Choice::Only(1999),
            ..Default::default()
        };
        let view = apply_filters(&t, &selection);
        assert!(view.is_empty());
        assert_eq!(view.iter().count(), 0);
    }

    #[test]
    fn choice_displays_all_sentinel() {
        assert_eq!(Choice::<i32>::All.to_string(), "All");
        assert_eq!(Choice::Only(2020).to_string(), "2020");
    }
}
