//! The dashboard's chart catalogue and the request/response entry point.

use std::collections::BTreeMap;

use serde::Serialize;

use super::aggregate::{AggregateRule, AggregateView, Reducer, aggregate};
use super::filter::{FilterSpec, filter};
use super::model::{GroupColumn, NumericColumn, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Macro,
    Micro,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Tab::Macro => "📊 Macro Analytics",
            Tab::Micro => "🔍 Micro Analytics",
        }
    }
}

/// Tunables that shape the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub bins: usize,
    pub top_n: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self { bins: 20, top_n: 10 }
    }
}

/// One chart of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ViewId {
    AdCredDistribution,
    RoiDistribution,
    RevenueByWeek,
    ImpressionsVsClicks,
    CartValueBySafetyBucket,
    PlatformShare,
    CorrelationMatrix,
    ConversionFunnel,
    AdCredVsRoi,
    RoiByPlatform,
    TopInfluencersByRoi,
    SentimentDistribution,
    FakeFollowersVsRoi,
    BrandSafetyByPlatform,
    AdCredByPlatform,
    StoryViewRateByPlatform,
    ContentMatchVsAdCred,
    PostingFrequencyByPlatform,
    RehireShare,
    ConversionsByWeek,
}

impl ViewId {
    /// Catalogue order: the macro tab first, then the micro tab.
    pub const ALL: [ViewId; 20] = [
        ViewId::AdCredDistribution,
        ViewId::RoiDistribution,
        ViewId::RevenueByWeek,
        ViewId::ImpressionsVsClicks,
        ViewId::CartValueBySafetyBucket,
        ViewId::PlatformShare,
        ViewId::CorrelationMatrix,
        ViewId::ConversionFunnel,
        ViewId::AdCredVsRoi,
        ViewId::RoiByPlatform,
        ViewId::TopInfluencersByRoi,
        ViewId::SentimentDistribution,
        ViewId::FakeFollowersVsRoi,
        ViewId::BrandSafetyByPlatform,
        ViewId::AdCredByPlatform,
        ViewId::StoryViewRateByPlatform,
        ViewId::ContentMatchVsAdCred,
        ViewId::PostingFrequencyByPlatform,
        ViewId::RehireShare,
        ViewId::ConversionsByWeek,
    ];

    pub fn tab(self) -> Tab {
        match self {
            ViewId::AdCredDistribution
            | ViewId::RoiDistribution
            | ViewId::RevenueByWeek
            | ViewId::ImpressionsVsClicks
            | ViewId::CartValueBySafetyBucket
            | ViewId::PlatformShare
            | ViewId::CorrelationMatrix => Tab::Macro,
            _ => Tab::Micro,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewId::AdCredDistribution => "AdCred Score Distribution",
            ViewId::RoiDistribution => "ROI Distribution",
            ViewId::RevenueByWeek => "Revenue by Week",
            ViewId::ImpressionsVsClicks => "Impressions vs Clicks",
            ViewId::CartValueBySafetyBucket => "Avg Cart Value by Safety Bucket",
            ViewId::PlatformShare => "Platform Share",
            ViewId::CorrelationMatrix => "Correlation Matrix",
            ViewId::ConversionFunnel => "Conversion Funnel",
            ViewId::AdCredVsRoi => "AdCred vs ROI",
            ViewId::RoiByPlatform => "ROI by Platform",
            ViewId::TopInfluencersByRoi => "Top Influencers by Avg ROI",
            ViewId::SentimentDistribution => "Sentiment Score Distribution",
            ViewId::FakeFollowersVsRoi => "Fake Follower % vs ROI",
            ViewId::BrandSafetyByPlatform => "Avg Brand Safety Rating by Platform",
            ViewId::AdCredByPlatform => "AdCred Score by Platform",
            ViewId::StoryViewRateByPlatform => "Avg Story View Rate by Platform",
            ViewId::ContentMatchVsAdCred => "Content Match Score vs AdCred",
            ViewId::PostingFrequencyByPlatform => "Avg Posting Frequency by Platform",
            ViewId::RehireShare => "Would Rehire?",
            ViewId::ConversionsByWeek => "Conversions by Week",
        }
    }

    pub fn rule(self, settings: &ViewSettings) -> AggregateRule {
        use GroupColumn as G;
        use NumericColumn as N;

        let bins = settings.bins;
        let mean_by_platform = |value| AggregateRule::Grouped {
            key: G::Platform,
            value,
            reducer: Reducer::Mean,
        };
        match self {
            ViewId::AdCredDistribution => AggregateRule::Distribution {
                column: N::AdCredScore,
                bins,
            },
            ViewId::RoiDistribution => AggregateRule::Distribution {
                column: N::Roi,
                bins,
            },
            ViewId::SentimentDistribution => AggregateRule::Distribution {
                column: N::SentimentScore,
                bins,
            },
            ViewId::RevenueByWeek => AggregateRule::Grouped {
                key: G::Week,
                value: N::Revenue,
                reducer: Reducer::Sum,
            },
            ViewId::ConversionsByWeek => AggregateRule::Grouped {
                key: G::Week,
                value: N::Conversions,
                reducer: Reducer::Sum,
            },
            ViewId::CartValueBySafetyBucket => AggregateRule::Grouped {
                key: G::SafetyBucket,
                value: N::CartValueUsd,
                reducer: Reducer::Mean,
            },
            ViewId::BrandSafetyByPlatform => mean_by_platform(N::BrandSafetyRating),
            ViewId::StoryViewRateByPlatform => mean_by_platform(N::StoryViewRatePct),
            ViewId::PostingFrequencyByPlatform => mean_by_platform(N::PostingFrequency),
            ViewId::TopInfluencersByRoi => AggregateRule::TopN {
                key: G::InfluencerName,
                value: N::Roi,
                n: settings.top_n,
            },
            ViewId::PlatformShare => AggregateRule::Share {
                column: G::Platform,
                normalize: false,
            },
            ViewId::RehireShare => AggregateRule::Share {
                column: G::WouldRehire,
                normalize: true,
            },
            ViewId::ImpressionsVsClicks => AggregateRule::Scatter {
                x: N::Impressions,
                y: N::Clicks,
            },
            ViewId::AdCredVsRoi => AggregateRule::Scatter {
                x: N::AdCredScore,
                y: N::Roi,
            },
            ViewId::FakeFollowersVsRoi => AggregateRule::Scatter {
                x: N::FakeFollowerPct,
                y: N::Roi,
            },
            ViewId::ContentMatchVsAdCred => AggregateRule::Scatter {
                x: N::ContentMatchScore,
                y: N::AdCredScore,
            },
            ViewId::RoiByPlatform => AggregateRule::Samples {
                key: G::Platform,
                value: N::Roi,
            },
            ViewId::AdCredByPlatform => AggregateRule::Samples {
                key: G::Platform,
                value: N::AdCredScore,
            },
            ViewId::ConversionFunnel => AggregateRule::Funnel,
            ViewId::CorrelationMatrix => AggregateRule::Correlation,
        }
    }
}

/// Every chart dataset for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    /// Rows that passed the filter.
    pub rows: usize,
    pub views: BTreeMap<ViewId, AggregateView>,
}

impl DashboardViews {
    pub fn get(&self, id: ViewId) -> Option<&AggregateView> {
        self.views.get(&id)
    }
}

/// Filter once, then derive every chart in catalogue order.
pub fn render(table: &Table, spec: &FilterSpec, settings: &ViewSettings) -> DashboardViews {
    let view = filter(table, spec);
    log::debug!("Filter kept {} of {} records", view.len(), table.len());

    let views = ViewId::ALL
        .iter()
        .map(|&id| (id, aggregate(&view, &id.rule(settings))))
        .collect();

    DashboardViews {
        rows: view.len(),
        views,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    #[test]
    fn catalogue_splits_into_two_tabs() {
        let macro_views = ViewId::ALL.iter().filter(|v| v.tab() == Tab::Macro).count();
        assert_eq!(macro_views, 7);
        assert_eq!(ViewId::ALL.len() - macro_views, 13);
    }

    #[test]
    fn settings_flow_into_rules() {
        let settings = ViewSettings { bins: 7, top_n: 3 };
        assert!(matches!(
            ViewId::RoiDistribution.rule(&settings),
            AggregateRule::Distribution { bins: 7, .. }
        ));
        assert!(matches!(
            ViewId::TopInfluencersByRoi.rule(&settings),
            AggregateRule::TopN { n: 3, .. }
        ));
    }

    #[test]
    fn render_produces_every_view() {
        let table = Table::from_records(vec![Record {
            platform: "IG".into(),
            influencer_name: "Ava".into(),
            ..Default::default()
        }]);
        let out = render(&table, &FilterSpec::select_all(&table), &ViewSettings::default());
        assert_eq!(out.rows, 1);
        assert_eq!(out.views.len(), ViewId::ALL.len());
        assert!(out.get(ViewId::PlatformShare).is_some_and(|v| !v.is_empty()));
    }

    #[test]
    fn export_serializes_missing_values_as_null() {
        let table = Table::from_records(vec![Record::default()]);
        let out = render(&table, &FilterSpec::select_all(&table), &ViewSettings::default());
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["rows"], 1);
        assert!(json["views"]["CorrelationMatrix"]["values"][0][0].is_null());
        assert_eq!(json["views"]["RevenueByWeek"]["kind"], "grouped");
    }
}
