use std::collections::BTreeSet;

use super::model::{Record, Table};

// ---------------------------------------------------------------------------
// Bounds – an inclusive range that is always ordered
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]`; the constructor reorders its arguments so
/// `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    min: T,
    max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(a: T, b: T) -> Self {
        if b < a {
            Self { min: b, max: a }
        } else {
            Self { min: a, max: b }
        }
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

// ---------------------------------------------------------------------------
// FilterSpec – the user's selection
// ---------------------------------------------------------------------------

/// The four sidebar predicates. An empty set selects nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub platforms: BTreeSet<String>,
    pub influencers: BTreeSet<String>,
    pub weeks: Bounds<i64>,
    pub adcred: Bounds<f64>,
}

impl FilterSpec {
    /// Everything selected and the full observed ranges (the sidebar default).
    pub fn select_all(table: &Table) -> Self {
        let (week_lo, week_hi) = table.week_bounds().unwrap_or((0, 0));
        let (adcred_lo, adcred_hi) = table.adcred_bounds().unwrap_or((0.0, 0.0));
        Self {
            platforms: table.platforms().iter().cloned().collect(),
            influencers: table.influencers().iter().cloned().collect(),
            weeks: Bounds::new(week_lo, week_hi),
            adcred: Bounds::new(adcred_lo, adcred_hi),
        }
    }

    /// Whether a record satisfies all four predicates.
    pub fn matches(&self, r: &Record) -> bool {
        self.platforms.contains(&r.platform)
            && self.influencers.contains(&r.influencer_name)
            && self.weeks.contains(r.week)
            && self.adcred.contains(r.adcred_score)
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the rows passing a FilterSpec
// ---------------------------------------------------------------------------

/// Rows of a [`Table`] that passed a filter, in table order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a Table,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row.
    pub fn all(table: &'a Table) -> Self {
        Self {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.table.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Apply `spec` to `table`. Never fails; the result may be empty.
pub fn filter<'a>(table: &'a Table, spec: &FilterSpec) -> FilteredView<'a> {
    let indices = table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| spec.matches(r))
        .map(|(i, _)| i)
        .collect();
    FilteredView { table, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(platform: &str, influencer: &str, week: i64, adcred: f64) -> Record {
        Record {
            platform: platform.into(),
            influencer_name: influencer.into(),
            week,
            adcred_score: adcred,
            ..Default::default()
        }
    }

    fn table() -> Table {
        Table::from_records(vec![
            rec("IG", "a", 1, 5.0),
            rec("TikTok", "b", 2, 7.0),
            rec("IG", "c", 3, 9.0),
            rec("YouTube", "a", 4, 2.5),
        ])
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn select_all_keeps_every_row() {
        let t = table();
        let view = filter(&t, &FilterSpec::select_all(&t));
        assert_eq!(view.indices(), [0, 1, 2, 3]);
    }

    #[test]
    fn bounds_are_inclusive() {
        let t = table();
        let mut spec = FilterSpec::select_all(&t);
        spec.weeks = Bounds::new(2, 3);
        spec.adcred = Bounds::new(7.0, 9.0);
        assert_eq!(filter(&t, &spec).indices(), [1, 2]);
    }

    #[test]
    fn inverted_bounds_are_reordered() {
        let b = Bounds::new(9.0, 1.0);
        assert_eq!((b.min(), b.max()), (1.0, 9.0));
        assert!(b.contains(5.0));
    }

    #[test]
    fn predicates_are_conjoined() {
        let t = table();
        let spec = FilterSpec {
            platforms: set(&["IG", "YouTube"]),
            influencers: set(&["a"]),
            weeks: Bounds::new(1, 4),
            adcred: Bounds::new(0.0, 10.0),
        };
        let view = filter(&t, &spec);
        assert_eq!(view.indices(), [0, 3]);
        assert!(view.iter().all(|r| r.influencer_name == "a"));
    }

    #[test]
    fn empty_selection_yields_empty_view() {
        let t = table();
        let mut spec = FilterSpec::select_all(&t);
        spec.influencers.clear();
        let view = filter(&t, &spec);
        assert!(view.is_empty());
        assert_eq!(view.iter().count(), 0);
    }

    #[test]
    fn select_all_on_empty_table() {
        let t = Table::from_records(Vec::new());
        let spec = FilterSpec::select_all(&t);
        assert!(spec.platforms.is_empty());
        assert!(filter(&t, &spec).is_empty());
    }
}
