//! Properties of the filter → aggregate → views pipeline, through the public API.

use influencer_dashboard::data::aggregate::{AggregateRule, AggregateView, Reducer, aggregate};
use influencer_dashboard::data::model::{GroupColumn, GroupKey, NumericColumn};
use influencer_dashboard::data::{
    Bounds, FilterSpec, Record, Table, ViewId, ViewSettings, filter, render,
};

fn record(platform: &str, name: &str, week: i64, adcred: f64, roi: f64, revenue: f64) -> Record {
    Record {
        platform: platform.into(),
        influencer_name: name.into(),
        week,
        adcred_score: adcred,
        roi,
        revenue,
        impressions: (adcred * 1000.0) as i64,
        clicks: (adcred * 10.0) as i64,
        safety_bucket: if adcred > 50.0 { "Low" } else { "High" }.into(),
        would_rehire: if roi > 0.0 { "Yes" } else { "No" }.into(),
        clicked: roi > -1.0,
        visited_landing: roi > 0.0,
        ..Default::default()
    }
}

fn campaign() -> Table {
    let names = ["ava", "ben", "cai", "dee", "eli", "fay", "gus", "hal", "ivy", "jo", "kit", "lu"];
    let platforms = ["Instagram", "TikTok", "YouTube"];
    let records = (0..48)
        .map(|i| {
            let name = names[i % names.len()];
            let platform = platforms[i % platforms.len()];
            let week = (i % 8) as i64 + 1;
            let adcred = 10.0 + (i * 7 % 90) as f64;
            let roi = ((i * 13 % 40) as f64 - 10.0) / 10.0;
            record(platform, name, week, adcred, roi, 100.0 * (i + 1) as f64)
        })
        .collect();
    Table::from_records(records)
}

#[test]
fn filtering_is_idempotent() {
    let table = campaign();
    let mut spec = FilterSpec::select_all(&table);
    spec.weeks = Bounds::new(2, 5);
    spec.platforms.remove("TikTok");

    let first = filter(&table, &spec);
    let second = filter(&table, &spec);
    assert_eq!(first.indices(), second.indices());

    let settings = ViewSettings::default();
    assert_eq!(render(&table, &spec, &settings), render(&table, &spec, &settings));
}

fn assert_superset(table: &Table, narrow: &FilterSpec, wide: &FilterSpec) {
    let kept = filter(table, narrow);
    let widened = filter(table, wide);
    assert!(kept.len() <= widened.len());
    assert!(kept.indices().iter().all(|i| widened.indices().contains(i)));
}

#[test]
fn widening_any_bound_never_drops_rows() {
    let table = campaign();
    let mut narrow = FilterSpec::select_all(&table);
    narrow.platforms = ["Instagram".to_string()].into();
    narrow.influencers = ["ava".to_string(), "dee".to_string(), "gus".to_string()].into();
    narrow.weeks = Bounds::new(3, 4);
    narrow.adcred = Bounds::new(30.0, 50.0);
    assert!(!filter(&table, &narrow).is_empty());

    let mut wide = narrow.clone();
    wide.weeks = Bounds::new(1, 6);
    assert_superset(&table, &narrow, &wide);

    let mut wide = narrow.clone();
    wide.adcred = Bounds::new(10.0, 90.0);
    assert_superset(&table, &narrow, &wide);

    let mut wide = narrow.clone();
    wide.platforms.insert("YouTube".to_string());
    assert_superset(&table, &narrow, &wide);

    let mut wide = narrow.clone();
    wide.influencers.extend(["ben".to_string(), "jo".to_string()]);
    assert_superset(&table, &narrow, &wide);

    let everything = FilterSpec::select_all(&table);
    assert_superset(&table, &narrow, &everything);
    assert_eq!(filter(&table, &everything).len(), table.len());
}

#[test]
fn every_row_is_classified_by_the_conjunction() {
    let table = campaign();
    let mut spec = FilterSpec::select_all(&table);
    spec.platforms = ["Instagram".to_string(), "YouTube".to_string()].into();
    spec.influencers.remove("ava");
    spec.weeks = Bounds::new(7, 2);
    spec.adcred = Bounds::new(20.0, 80.0);

    let view = filter(&table, &spec);
    for (i, r) in table.records().iter().enumerate() {
        let expected = spec.platforms.contains(&r.platform)
            && spec.influencers.contains(&r.influencer_name)
            && (2..=7).contains(&r.week)
            && (20.0..=80.0).contains(&r.adcred_score);
        assert_eq!(view.indices().contains(&i), expected, "row {i}");
    }
}

#[test]
fn grouped_and_share_counts_sum_to_the_row_count() {
    let table = campaign();
    let mut spec = FilterSpec::select_all(&table);
    spec.adcred = Bounds::new(0.0, 60.0);
    let views = render(&table, &spec, &ViewSettings::default());
    assert!(views.rows > 0);

    for id in [ViewId::RevenueByWeek, ViewId::ConversionsByWeek, ViewId::RoiByPlatform] {
        let total: usize = match views.get(id) {
            Some(AggregateView::Grouped(g)) => g.rows.iter().map(|r| r.count).sum(),
            Some(AggregateView::Samples(s)) => s.groups.iter().map(|g| g.values.len()).sum(),
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(total, views.rows, "{id:?}");
    }

    let Some(AggregateView::Share(platforms)) = views.get(ViewId::PlatformShare) else {
        panic!("platform share missing");
    };
    let total: usize = platforms.rows.iter().map(|r| r.count).sum();
    assert_eq!(total, views.rows);

    let Some(AggregateView::Share(rehire)) = views.get(ViewId::RehireShare) else {
        panic!("rehire share missing");
    };
    let proportion: f64 = rehire.rows.iter().map(|r| r.proportion).sum();
    assert!((proportion - 1.0).abs() < 1e-9);

    let Some(AggregateView::Histogram(h)) = views.get(ViewId::AdCredDistribution) else {
        panic!("histogram missing");
    };
    assert_eq!(h.counts.iter().sum::<usize>(), views.rows);
}

#[test]
fn top_influencers_are_bounded_and_descending() {
    let table = campaign();
    let views = render(&table, &FilterSpec::select_all(&table), &ViewSettings::default());
    let Some(AggregateView::Grouped(top)) = views.get(ViewId::TopInfluencersByRoi) else {
        panic!("ranking missing");
    };
    assert_eq!(top.rows.len(), 10);
    let means: Vec<f64> = top.rows.iter().filter_map(|r| r.value).collect();
    assert_eq!(means.len(), 10);
    assert!(means.windows(2).all(|w| w[0] >= w[1]));

    let few = render(
        &table,
        &FilterSpec::select_all(&table),
        &ViewSettings { bins: 20, top_n: 3 },
    );
    let Some(AggregateView::Grouped(top)) = few.get(ViewId::TopInfluencersByRoi) else {
        panic!("ranking missing");
    };
    assert_eq!(top.rows.len(), 3);
}

#[test]
fn correlation_is_symmetric_with_unit_diagonal() {
    let table = campaign();
    let view = filter(&table, &FilterSpec::select_all(&table));
    let AggregateView::Correlation(m) = aggregate(&view, &AggregateRule::Correlation) else {
        panic!("expected a correlation matrix");
    };
    let n = m.columns.len();
    for i in 0..n {
        if let Some(d) = m.get(i, i) {
            assert!((d - 1.0).abs() < 1e-9);
        }
        for j in 0..n {
            assert_eq!(m.get(i, j), m.get(j, i));
            if let Some(r) = m.get(i, j) {
                assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&r));
            }
        }
    }
}

#[test]
fn three_row_ig_selection() {
    let table = Table::from_records(vec![
        record("IG", "a", 1, 5.0, 2.0, 10.0),
        record("TikTok", "b", 2, 7.0, 3.0, 20.0),
        record("IG", "c", 3, 9.0, 1.0, 30.0),
    ]);
    let mut spec = FilterSpec::select_all(&table);
    spec.platforms = ["IG".to_string()].into();
    spec.weeks = Bounds::new(1, 3);
    spec.adcred = Bounds::new(0.0, 10.0);

    let view = filter(&table, &spec);
    assert_eq!(view.indices(), [0, 2]);

    let AggregateView::Grouped(roi_by_week) = aggregate(
        &view,
        &AggregateRule::Grouped {
            key: GroupColumn::Week,
            value: NumericColumn::Roi,
            reducer: Reducer::Sum,
        },
    ) else {
        panic!("expected grouped values");
    };
    let sums: Vec<_> = roi_by_week.rows.iter().map(|r| (r.key.clone(), r.value)).collect();
    assert_eq!(
        sums,
        [(GroupKey::Int(1), Some(2.0)), (GroupKey::Int(3), Some(1.0))]
    );

    let views = render(&table, &spec, &ViewSettings::default());
    assert_eq!(views.rows, 2);
    let Some(AggregateView::Share(share)) = views.get(ViewId::PlatformShare) else {
        panic!("share missing");
    };
    assert_eq!(share.column, GroupColumn::Platform);
    let counts: Vec<_> = share.rows.iter().map(|r| (r.key.clone(), r.count)).collect();
    assert_eq!(counts, [(GroupKey::from("IG"), 2)]);
}

#[test]
fn empty_platform_selection_renders_empty_views() {
    let table = campaign();
    let mut spec = FilterSpec::select_all(&table);
    spec.platforms.clear();

    let views = render(&table, &spec, &ViewSettings::default());
    assert_eq!(views.rows, 0);
    assert_eq!(views.views.len(), ViewId::ALL.len());
    for (id, view) in &views.views {
        assert!(view.is_empty(), "{id:?} should be empty");
    }
}
