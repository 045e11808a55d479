use std::collections::HashMap;

use serde::Serialize;

use super::filter::FilteredView;
use super::model::{GroupColumn, GroupKey, NumericColumn, Record};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    Sum,
    Mean,
}

impl Reducer {
    /// Reduce an accumulated group. The mean of zero rows is missing.
    pub fn finish(self, sum: f64, count: usize) -> Option<f64> {
        match self {
            Reducer::Sum => Some(sum),
            Reducer::Mean if count == 0 => None,
            Reducer::Mean => Some(sum / count as f64),
        }
    }
}

/// How one chart's dataset is derived from the filtered rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateRule {
    /// Equal-width histogram over the observed range.
    Distribution { column: NumericColumn, bins: usize },
    /// One reduced value per group, ordered by key.
    Grouped {
        key: GroupColumn,
        value: NumericColumn,
        reducer: Reducer,
    },
    /// The `n` groups with the highest mean.
    TopN {
        key: GroupColumn,
        value: NumericColumn,
        n: usize,
    },
    /// Row count (or proportion when `normalize`) per distinct value.
    Share { column: GroupColumn, normalize: bool },
    /// Raw `(x, y)` pairs.
    Scatter { x: NumericColumn, y: NumericColumn },
    /// Raw values per group, with a box-plot summary.
    Samples { key: GroupColumn, value: NumericColumn },
    /// Number of rows reaching each conversion stage.
    Funnel,
    /// Pearson correlation across every numeric column.
    Correlation,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: NumericColumn,
    /// `counts.len() + 1` edges, or none at all for an empty view.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> Option<f64> {
        match self.edges.as_slice() {
            [first, second, ..] => Some(second - first),
            _ => None,
        }
    }

    /// `(bin centre, count)` pairs.
    pub fn bars(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| ((w[0] + w[1]) / 2.0, c))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: GroupKey,
    pub value: Option<f64>,
    /// Rows that fell into the group.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedValues {
    pub key: GroupColumn,
    pub value: NumericColumn,
    pub reducer: Reducer,
    pub rows: Vec<GroupRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub key: GroupKey,
    pub count: usize,
    pub proportion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareTable {
    pub column: GroupColumn,
    pub normalize: bool,
    pub rows: Vec<ShareRow>,
}

impl ShareRow {
    pub fn value(&self, normalize: bool) -> f64 {
        if normalize {
            self.proportion
        } else {
            self.count as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoints {
    pub x: NumericColumn,
    pub y: NumericColumn,
    pub points: Vec<[f64; 2]>,
}

/// Five-number summary with Tukey fences (1.5 × IQR).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = || sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
        let lower_whisker = inside().next().unwrap_or(q1);
        let upper_whisker = inside().last().unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect();

        Some(Self {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleGroup {
    pub key: GroupKey,
    pub values: Vec<f64>,
    pub summary: Option<BoxSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedSamples {
    pub key: GroupColumn,
    pub value: NumericColumn,
    /// First-seen group order.
    pub groups: Vec<SampleGroup>,
}

/// Stages of the conversion funnel, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FunnelStage {
    Clicked,
    VisitedLanding,
    DownloadedOffer,
    Purchased,
}

impl FunnelStage {
    pub const ALL: [FunnelStage; 4] = [
        FunnelStage::Clicked,
        FunnelStage::VisitedLanding,
        FunnelStage::DownloadedOffer,
        FunnelStage::Purchased,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FunnelStage::Clicked => "Clicked",
            FunnelStage::VisitedLanding => "Visited_Landing",
            FunnelStage::DownloadedOffer => "Downloaded_Offer",
            FunnelStage::Purchased => "Purchased",
        }
    }

    pub fn reached(self, r: &Record) -> bool {
        match self {
            FunnelStage::Clicked => r.clicked,
            FunnelStage::VisitedLanding => r.visited_landing,
            FunnelStage::DownloadedOffer => r.downloaded_offer,
            FunnelStage::Purchased => r.purchased,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStep {
    pub stage: FunnelStage,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelCounts {
    /// Rows the stages were counted over.
    pub rows: usize,
    pub steps: Vec<FunnelStep>,
}

/// Symmetric Pearson matrix; `None` where a coefficient is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    /// Rows the coefficients were computed from.
    pub rows: usize,
    pub columns: Vec<NumericColumn>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied().flatten()
    }
}

/// The dataset behind one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateView {
    Histogram(Histogram),
    Grouped(GroupedValues),
    Share(ShareTable),
    Scatter(ScatterPoints),
    Samples(GroupedSamples),
    Funnel(FunnelCounts),
    Correlation(CorrelationMatrix),
}

impl AggregateView {
    /// Whether the view was derived from zero rows.
    pub fn is_empty(&self) -> bool {
        match self {
            AggregateView::Histogram(h) => h.counts.is_empty(),
            AggregateView::Grouped(g) => g.rows.is_empty(),
            AggregateView::Share(s) => s.rows.is_empty(),
            AggregateView::Scatter(s) => s.points.is_empty(),
            AggregateView::Samples(s) => s.groups.is_empty(),
            AggregateView::Funnel(f) => f.rows == 0,
            AggregateView::Correlation(c) => c.rows == 0,
        }
    }
}

// ---------------------------------------------------------------------------
// aggregate
// ---------------------------------------------------------------------------

/// Derive one chart dataset from the filtered rows. Never fails.
pub fn aggregate(view: &FilteredView<'_>, rule: &AggregateRule) -> AggregateView {
    match *rule {
        AggregateRule::Distribution { column, bins } => {
            AggregateView::Histogram(histogram(view, column, bins))
        }
        AggregateRule::Grouped {
            key,
            value,
            reducer,
        } => AggregateView::Grouped(grouped(view, key, value, reducer)),
        AggregateRule::TopN { key, value, n } => AggregateView::Grouped(top_n(view, key, value, n)),
        AggregateRule::Share { column, normalize } => {
            AggregateView::Share(share(view, column, normalize))
        }
        AggregateRule::Scatter { x, y } => AggregateView::Scatter(ScatterPoints {
            x,
            y,
            points: view.iter().map(|r| [x.value(r), y.value(r)]).collect(),
        }),
        AggregateRule::Samples { key, value } => AggregateView::Samples(samples(view, key, value)),
        AggregateRule::Funnel => AggregateView::Funnel(funnel(view)),
        AggregateRule::Correlation => AggregateView::Correlation(correlation(view)),
    }
}

fn histogram(view: &FilteredView<'_>, column: NumericColumn, bins: usize) -> Histogram {
    let values: Vec<f64> = view.iter().map(|r| column.value(r)).collect();
    let empty = Histogram {
        column,
        edges: Vec::new(),
        counts: Vec::new(),
    };
    if values.is_empty() || bins == 0 {
        return empty;
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut edges: Vec<f64> = (0..bins).map(|i| lo + width * i as f64).collect();
    edges.push(hi);

    let mut counts = vec![0usize; bins];
    for v in values {
        // The last bin is closed on the right.
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram {
        column,
        edges,
        counts,
    }
}

struct Group {
    key: GroupKey,
    sum: f64,
    count: usize,
}

/// Sum and count per group, in first-seen order.
fn accumulate(view: &FilteredView<'_>, key: GroupColumn, value: NumericColumn) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    for r in view.iter() {
        let k = key.key(r);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push(Group {
                key: k,
                sum: 0.0,
                count: 0,
            });
            groups.len() - 1
        });
        groups[slot].sum += value.value(r);
        groups[slot].count += 1;
    }
    groups
}

fn grouped(
    view: &FilteredView<'_>,
    key: GroupColumn,
    value: NumericColumn,
    reducer: Reducer,
) -> GroupedValues {
    let mut rows: Vec<GroupRow> = accumulate(view, key, value)
        .into_iter()
        .map(|g| GroupRow {
            value: reducer.finish(g.sum, g.count),
            key: g.key,
            count: g.count,
        })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    GroupedValues {
        key,
        value,
        reducer,
        rows,
    }
}

fn top_n(view: &FilteredView<'_>, key: GroupColumn, value: NumericColumn, n: usize) -> GroupedValues {
    let mut rows: Vec<GroupRow> = accumulate(view, key, value)
        .into_iter()
        .map(|g| GroupRow {
            value: Reducer::Mean.finish(g.sum, g.count),
            key: g.key,
            count: g.count,
        })
        .collect();
    // Stable: equal means keep first-seen order.
    rows.sort_by(|a, b| {
        let a = a.value.unwrap_or(f64::NEG_INFINITY);
        let b = b.value.unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
    rows.truncate(n);
    GroupedValues {
        key,
        value,
        reducer: Reducer::Mean,
        rows,
    }
}

fn share(view: &FilteredView<'_>, column: GroupColumn, normalize: bool) -> ShareTable {
    let total = view.len();
    // The value column is irrelevant for counting.
    let mut rows: Vec<ShareRow> = accumulate(view, column, NumericColumn::Week)
        .into_iter()
        .map(|g| ShareRow {
            key: g.key,
            count: g.count,
            proportion: g.count as f64 / total as f64,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    ShareTable {
        column,
        normalize,
        rows,
    }
}

fn samples(view: &FilteredView<'_>, key: GroupColumn, value: NumericColumn) -> GroupedSamples {
    let mut groups: Vec<SampleGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    for r in view.iter() {
        let k = key.key(r);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push(SampleGroup {
                key: k,
                values: Vec::new(),
                summary: None,
            });
            groups.len() - 1
        });
        groups[slot].values.push(value.value(r));
    }
    for g in &mut groups {
        g.summary = BoxSummary::from_values(&g.values);
    }
    GroupedSamples { key, value, groups }
}

fn funnel(view: &FilteredView<'_>) -> FunnelCounts {
    let steps = FunnelStage::ALL
        .iter()
        .map(|&stage| FunnelStep {
            stage,
            count: view.iter().filter(|r| stage.reached(r)).count(),
        })
        .collect();
    FunnelCounts {
        rows: view.len(),
        steps,
    }
}

fn correlation(view: &FilteredView<'_>) -> CorrelationMatrix {
    let columns = NumericColumn::ALL.to_vec();
    let data: Vec<Vec<f64>> = columns
        .iter()
        .map(|c| view.iter().map(|r| c.value(r)).collect())
        .collect();
    let varies: Vec<bool> = data
        .iter()
        .map(|xs| xs.len() >= 2 && xs.iter().any(|&x| x != xs[0]))
        .collect();

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        if !varies[i] {
            continue;
        }
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            if varies[j] {
                let r = pearson(&data[i], &data[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }
    }
    CorrelationMatrix {
        rows: view.len(),
        columns,
        values,
    }
}

/// Pearson coefficient of two equally long samples with non-zero variance.
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    (denom > 0.0).then(|| (sxy / denom).clamp(-1.0, 1.0))
}
